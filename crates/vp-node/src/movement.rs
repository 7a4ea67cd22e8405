//! Movement label grammar.
//!
//! VISSIM names a node-evaluation movement by its node number followed by
//! the from-link and to-link names:
//!
//! ```text
//! 101: Link5 @ Link9     node 101, from "Link5", to "Link9"
//! 101@Link9              node 101, no from-link, to "Link9"
//! 101: Link5             node 101, from "Link5", no to-link
//! 101                    node 101 only
//! ```
//!
//! Absent links are empty strings, never `None`.  A label without a leading
//! node number is rejected.

use std::sync::LazyLock;

use regex::Regex;

use vp_core::NodeNo;

use crate::{NodeError, NodeResult};

static MOVEMENT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<node>\d+)[^:@]*(?::(?P<from>[^@]*))?(?:@(?P<to>.*))?$")
        .expect("static pattern")
});

/// The parts of a movement label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MovementLabel {
    pub node:      NodeNo,
    pub from_link: String,
    pub to_link:   String,
}

impl MovementLabel {
    /// Render back into label form (`"<node>: <from> @ <to>"`).
    pub fn compose(&self) -> String {
        format!("{}: {} @ {}", self.node, self.from_link, self.to_link)
    }
}

/// Parse a movement label.
pub fn parse_movement(label: &str) -> NodeResult<MovementLabel> {
    let malformed = || NodeError::MalformedMovement(label.to_owned());
    let caps = MOVEMENT_LABEL.captures(label).ok_or_else(malformed)?;
    let node = caps["node"].parse::<NodeNo>().map_err(|_| malformed())?;
    let part = |name: &str| caps.name(name).map_or(String::new(), |m| m.as_str().trim().to_owned());
    Ok(MovementLabel {
        node,
        from_link: part("from"),
        to_link:   part("to"),
    })
}
