//! Loaded-once syllabus tree with precomputed indexes.
//!
//! # Responsibility
//! - Parse the static roadmap document into an immutable tree.
//! - Build the flattened topic list, the parent index and per-parent child
//!   lists once, so sibling and ancestor lookups are map accesses.
//!
//! # Invariants
//! - Topic ids are unique across the whole tree (duplicates are rejected).
//! - A container object is a topic only when it carries a non-blank id.
//!   Either way its children are the top-level topics, which share the
//!   implicit root as parent; the container never takes part in sibling
//!   or ancestor lookups.
//! - A syllabus always holds at least one topic.
//! - Flattened order is depth-first pre-order, matching on-screen order.

use crate::model::topic::{TopicId, TopicNode};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod search;
pub mod source;

pub type SyllabusResult<T> = Result<T, SyllabusError>;

/// Errors raised while fetching or indexing a syllabus document.
#[derive(Debug)]
pub enum SyllabusError {
    /// The resource could not be read.
    Fetch {
        location: String,
        source: std::io::Error,
    },
    /// The resource is not a valid syllabus document.
    Parse(serde_json::Error),
    /// Two nodes share one id.
    DuplicateTopicId(TopicId),
    /// A node carries a blank id.
    BlankTopicId { title: String },
    /// The document parsed but holds no topics.
    Empty,
}

impl Display for SyllabusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch { location, source } => {
                write!(f, "cannot read syllabus from `{location}`: {source}")
            }
            Self::Parse(err) => write!(f, "malformed syllabus document: {err}"),
            Self::DuplicateTopicId(id) => write!(f, "duplicate topic id `{id}`"),
            Self::BlankTopicId { title } => write!(f, "topic `{title}` has a blank id"),
            Self::Empty => f.write_str("syllabus document contains no topics"),
        }
    }
}

impl Error for SyllabusError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::DuplicateTopicId(_) | Self::BlankTopicId { .. } | Self::Empty => None,
        }
    }
}

impl From<serde_json::Error> for SyllabusError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Accepted top-level shapes: a container object or a bare topic array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SyllabusDocument {
    Forest(Vec<TopicNode>),
    #[serde(rename_all = "camelCase")]
    Container {
        #[serde(default)]
        id: Option<TopicId>,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        brief_description: Option<String>,
        children: Vec<TopicNode>,
    },
}

/// Flattened view of one topic with its position in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatTopic {
    pub id: TopicId,
    pub title: String,
    pub description: Option<String>,
    pub brief_description: Option<String>,
    /// `None` for top-level topics.
    pub parent_id: Option<TopicId>,
    /// Zero for top-level topics.
    pub depth: usize,
    pub child_count: usize,
}

/// Immutable syllabus tree plus lookup indexes.
#[derive(Debug, Clone)]
pub struct Syllabus {
    title: Option<String>,
    /// Id of the container when it is itself a topic.
    root_id: Option<TopicId>,
    roots: Vec<TopicNode>,
    flat: Vec<FlatTopic>,
    position: HashMap<TopicId, usize>,
    /// Children per parent; key `None` is the implicit root.
    children: HashMap<Option<TopicId>, Vec<TopicId>>,
}

impl Syllabus {
    /// Parses and indexes a JSON syllabus document.
    pub fn from_json_str(json: &str) -> SyllabusResult<Self> {
        let document: SyllabusDocument = serde_json::from_str(json)?;
        match document {
            SyllabusDocument::Forest(roots) => Self::from_roots(None, roots),
            SyllabusDocument::Container {
                id,
                title,
                description,
                brief_description,
                children,
            } => {
                let root = id.filter(|id| !id.trim().is_empty()).map(|id| FlatTopic {
                    id,
                    title: title.clone().unwrap_or_default(),
                    description,
                    brief_description,
                    parent_id: None,
                    depth: 0,
                    child_count: children.len(),
                });
                Self::build(title, root, children)
            }
        }
    }

    /// Indexes an already-built list of top-level topics.
    pub fn from_roots(title: Option<String>, roots: Vec<TopicNode>) -> SyllabusResult<Self> {
        Self::build(title, None, roots)
    }

    fn build(
        title: Option<String>,
        root: Option<FlatTopic>,
        roots: Vec<TopicNode>,
    ) -> SyllabusResult<Self> {
        let mut syllabus = Self {
            title,
            root_id: None,
            roots: Vec::new(),
            flat: Vec::new(),
            position: HashMap::new(),
            children: HashMap::new(),
        };

        let mut seen = HashSet::new();
        if let Some(root) = root {
            seen.insert(root.id.clone());
            syllabus.position.insert(root.id.clone(), 0);
            syllabus.root_id = Some(root.id.clone());
            syllabus.flat.push(root);
        }
        for root in &roots {
            syllabus.index_node(root, None, 0, &mut seen)?;
        }
        if syllabus.flat.is_empty() {
            return Err(SyllabusError::Empty);
        }
        syllabus.roots = roots;
        Ok(syllabus)
    }

    fn index_node(
        &mut self,
        node: &TopicNode,
        parent_id: Option<&str>,
        depth: usize,
        seen: &mut HashSet<TopicId>,
    ) -> SyllabusResult<()> {
        if node.id.trim().is_empty() {
            return Err(SyllabusError::BlankTopicId {
                title: node.title.clone(),
            });
        }
        if !seen.insert(node.id.clone()) {
            return Err(SyllabusError::DuplicateTopicId(node.id.clone()));
        }

        self.position.insert(node.id.clone(), self.flat.len());
        self.children
            .entry(parent_id.map(str::to_string))
            .or_default()
            .push(node.id.clone());
        self.flat.push(FlatTopic {
            id: node.id.clone(),
            title: node.title.clone(),
            description: node.description.clone(),
            brief_description: node.brief_description.clone(),
            parent_id: parent_id.map(str::to_string),
            depth,
            child_count: node.children.len(),
        });

        for child in &node.children {
            self.index_node(child, Some(node.id.as_str()), depth + 1, seen)?;
        }
        Ok(())
    }

    /// Document title, when the container carries one.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Id of the document container, when it is itself a topic.
    pub fn root_id(&self) -> Option<&str> {
        self.root_id.as_deref()
    }

    /// Top-level topics in document order.
    pub fn roots(&self) -> &[TopicNode] {
        &self.roots
    }

    /// Every topic, depth-first pre-order.
    pub fn topics(&self) -> &[FlatTopic] {
        &self.flat
    }

    pub fn len(&self) -> usize {
        self.flat.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position.contains_key(id)
    }

    pub fn topic(&self, id: &str) -> Option<&FlatTopic> {
        self.position.get(id).map(|index| &self.flat[*index])
    }

    /// Parent of `id`: `Some(None)` for top-level topics, `None` when the
    /// id is unknown.
    pub fn parent_of(&self, id: &str) -> Option<Option<&str>> {
        self.topic(id).map(|topic| topic.parent_id.as_deref())
    }

    /// Child ids of `parent` (`None` = top level) in document order.
    pub fn children_of(&self, parent: Option<&str>) -> &[TopicId] {
        self.children
            .get(&parent.map(str::to_string))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Other children of `id`'s parent. Empty for unknown ids and for the
    /// document container.
    pub fn siblings_of(&self, id: &str) -> Vec<&str> {
        if self.root_id.as_deref() == Some(id) {
            return Vec::new();
        }
        let Some(parent) = self.parent_of(id) else {
            return Vec::new();
        };
        self.children_of(parent)
            .iter()
            .map(String::as_str)
            .filter(|candidate| *candidate != id)
            .collect()
    }

    /// Ancestor ids from the top level down to `id`'s parent.
    ///
    /// Returns `None` for unknown ids and an empty path for top-level ones.
    pub fn path_to(&self, id: &str) -> Option<Vec<TopicId>> {
        let mut cursor = self.topic(id)?.parent_id.as_deref();
        let mut path = Vec::new();
        while let Some(ancestor) = cursor {
            path.push(ancestor.to_string());
            cursor = self.topic(ancestor).and_then(|t| t.parent_id.as_deref());
        }
        path.reverse();
        Some(path)
    }
}
