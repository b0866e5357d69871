use std::fmt;

/// Nodes holding a key, primary first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicaPlacement {
    pub key: String,
    pub nodes: Vec<String>,
}

impl ReplicaPlacement {
    pub fn primary(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }

    pub fn replicas(&self) -> &[String] {
        self.nodes.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for ReplicaPlacement {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Key '{}' is stored in nodes: [{}]", self.key, self.nodes.join(", "))
    }
}
