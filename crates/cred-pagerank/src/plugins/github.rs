//! The GitHub plugin declaration and address constructors.
//!
//! Node addresses live under `["sourcecred", "github", <TYPE>, ...]` and
//! edge addresses under the same base with an edge type tag. An edge's
//! address embeds the addresses of its endpoints, each preceded by its
//! component count so the encoding stays unambiguous.

use super::{EdgeType, NodeType, PluginDeclaration};
use cred_graph::{AddressError, Edge, EdgeAddress, NodeAddress};

const BASE: [&str; 2] = ["sourcecred", "github"];

/// Tags for the node families this plugin creates.
pub mod node_tag {
    pub const REPO: &[&str] = &["REPO"];
    pub const ISSUE: &[&str] = &["ISSUE"];
    pub const PULL: &[&str] = &["PULL"];
    pub const REVIEW: &[&str] = &["REVIEW"];
    pub const COMMENT: &[&str] = &["COMMENT"];
    pub const USER: &[&str] = &["USERLIKE", "USER"];
    pub const BOT: &[&str] = &["USERLIKE", "BOT"];
}

/// Tags for the edge families this plugin creates.
pub mod edge_tag {
    pub const AUTHORS: &[&str] = &["AUTHORS"];
    pub const HAS_PARENT: &[&str] = &["HAS_PARENT"];
    pub const MERGED_AS: &[&str] = &["MERGED_AS"];
    pub const REFERENCES: &[&str] = &["REFERENCES"];
    pub const MENTIONS_AUTHOR: &[&str] = &["MENTIONS_AUTHOR"];
    pub const REACTS_HEART: &[&str] = &["REACTS", "HEART"];
    pub const REACTS_THUMBS_UP: &[&str] = &["REACTS", "THUMBS_UP"];
    pub const REACTS_HOORAY: &[&str] = &["REACTS", "HOORAY"];
    pub const REACTS_ROCKET: &[&str] = &["REACTS", "ROCKET"];
}

pub fn node_prefix() -> Result<NodeAddress, AddressError> {
    NodeAddress::from_parts(BASE)
}

pub fn edge_prefix() -> Result<EdgeAddress, AddressError> {
    EdgeAddress::from_parts(BASE)
}

fn node_type_prefix(tag: &[&str]) -> Result<NodeAddress, AddressError> {
    node_prefix()?.append(tag.iter().copied())
}

fn edge_type_prefix(tag: &[&str]) -> Result<EdgeAddress, AddressError> {
    edge_prefix()?.append(tag.iter().copied())
}

fn node_type(
    name: &str,
    plural_name: &str,
    tag: &[&str],
    default_weight: f64,
    description: &str,
) -> Result<NodeType, AddressError> {
    Ok(NodeType {
        name: name.to_string(),
        plural_name: plural_name.to_string(),
        prefix: node_type_prefix(tag)?,
        default_weight,
        description: description.to_string(),
    })
}

fn edge_type(
    forward_name: &str,
    backward_name: &str,
    tag: &[&str],
    weights: (f64, f64),
    description: &str,
) -> Result<EdgeType, AddressError> {
    Ok(EdgeType {
        forward_name: forward_name.to_string(),
        backward_name: backward_name.to_string(),
        prefix: edge_type_prefix(tag)?,
        default_forward_weight: weights.0,
        default_backward_weight: weights.1,
        description: description.to_string(),
    })
}

/// The GitHub plugin's node and edge types with their default weights.
pub fn declaration() -> Result<PluginDeclaration, AddressError> {
    let node_types = vec![
        node_type("Repository", "Repositories", node_tag::REPO, 4.0, "A GitHub repository")?,
        node_type("Issue", "Issues", node_tag::ISSUE, 2.0, "A GitHub issue")?,
        node_type("Pull request", "Pull requests", node_tag::PULL, 4.0, "A GitHub pull request")?,
        node_type(
            "Pull request review",
            "Pull request reviews",
            node_tag::REVIEW,
            1.0,
            "A review left on a pull request",
        )?,
        node_type("Comment", "Comments", node_tag::COMMENT, 1.0, "A comment on an issue, pull or review")?,
        node_type("User", "Users", node_tag::USER, 1.0, "A GitHub user account")?,
        node_type("Bot", "Bots", node_tag::BOT, 0.25, "A GitHub bot account")?,
    ];

    let edge_types = vec![
        edge_type(
            "authors",
            "is authored by",
            edge_tag::AUTHORS,
            (0.5, 1.0),
            "Connects an account to a post it wrote: an issue, pull request, review or comment.",
        )?,
        edge_type(
            "has parent",
            "has child",
            edge_tag::HAS_PARENT,
            (1.0, 0.25),
            "Connects an entity to its container, such as an issue to its repository \
             or a comment to its pull request.",
        )?,
        edge_type(
            "merges",
            "is merged by",
            edge_tag::MERGED_AS,
            (0.5, 1.0),
            "Connects a merged pull request to the commit it produced.",
        )?,
        edge_type(
            "references",
            "is referenced by",
            edge_tag::REFERENCES,
            (1.0, 1.0 / 16.0),
            "Connects a post to an entity it links to, like a user mention or `#1337`.",
        )?,
        edge_type(
            "mentions author of",
            "has author mentioned by",
            edge_tag::MENTIONS_AUTHOR,
            (1.0, 1.0 / 32.0),
            "Connects a post that mentions a user to that user's posts in the same thread.",
        )?,
        edge_type(
            "reacted 👍 to",
            "got 👍 from",
            edge_tag::REACTS_THUMBS_UP,
            (1.0, 1.0 / 32.0),
            "Connects a user to a post they gave a 👍 reaction.",
        )?,
        edge_type(
            "reacted ❤️ to",
            "got ❤️ from",
            edge_tag::REACTS_HEART,
            (2.0, 1.0 / 32.0),
            "Connects a user to a post they gave a ❤️ reaction.",
        )?,
        edge_type(
            "reacted 🎉 to",
            "got 🎉 from",
            edge_tag::REACTS_HOORAY,
            (4.0, 1.0 / 32.0),
            "Connects a user to a post they gave a 🎉 reaction.",
        )?,
        edge_type(
            "reacted 🚀 to",
            "got 🚀 from",
            edge_tag::REACTS_ROCKET,
            (1.0, 1.0 / 32.0),
            "Connects a user to a post they gave a 🚀 reaction.",
        )?,
    ];

    Ok(PluginDeclaration {
        name: "GitHub".to_string(),
        node_prefix: node_prefix()?,
        edge_prefix: edge_prefix()?,
        node_types,
        edge_types,
    })
}

pub fn repo(owner: &str, name: &str) -> Result<NodeAddress, AddressError> {
    node_type_prefix(node_tag::REPO)?.append([owner, name])
}

pub fn issue(owner: &str, name: &str, number: u64) -> Result<NodeAddress, AddressError> {
    node_type_prefix(node_tag::ISSUE)?.append([owner.to_string(), name.to_string(), number.to_string()])
}

pub fn pull(owner: &str, name: &str, number: u64) -> Result<NodeAddress, AddressError> {
    node_type_prefix(node_tag::PULL)?.append([owner.to_string(), name.to_string(), number.to_string()])
}

pub fn review(owner: &str, name: &str, pull: u64, id: &str) -> Result<NodeAddress, AddressError> {
    node_type_prefix(node_tag::REVIEW)?.append([
        owner.to_string(),
        name.to_string(),
        pull.to_string(),
        id.to_string(),
    ])
}

/// A comment on the issue or pull request `number`.
pub fn comment(owner: &str, name: &str, number: u64, id: &str) -> Result<NodeAddress, AddressError> {
    node_type_prefix(node_tag::COMMENT)?.append([
        owner.to_string(),
        name.to_string(),
        number.to_string(),
        id.to_string(),
    ])
}

pub fn user(login: &str) -> Result<NodeAddress, AddressError> {
    node_type_prefix(node_tag::USER)?.append([login])
}

pub fn bot(login: &str) -> Result<NodeAddress, AddressError> {
    node_type_prefix(node_tag::BOT)?.append([login])
}

/// GitHub reactions that produce edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reaction {
    ThumbsUp,
    Heart,
    Hooray,
    Rocket,
}

impl Reaction {
    fn tag(self) -> &'static [&'static str] {
        match self {
            Self::ThumbsUp => edge_tag::REACTS_THUMBS_UP,
            Self::Heart => edge_tag::REACTS_HEART,
            Self::Hooray => edge_tag::REACTS_HOORAY,
            Self::Rocket => edge_tag::REACTS_ROCKET,
        }
    }
}

fn edge_between(tag: &[&str], src: &NodeAddress, dst: &NodeAddress) -> Result<Edge, AddressError> {
    let address = edge_type_prefix(tag)?
        .append([src.len().to_string()])?
        .append(src.parts().iter().cloned())?
        .append([dst.len().to_string()])?
        .append(dst.parts().iter().cloned())?;
    Ok(Edge::new(address, src.clone(), dst.clone()))
}

/// `author` wrote `post`.
pub fn authors_edge(author: &NodeAddress, post: &NodeAddress) -> Result<Edge, AddressError> {
    edge_between(edge_tag::AUTHORS, author, post)
}

/// `child` is contained in `parent`.
pub fn has_parent_edge(child: &NodeAddress, parent: &NodeAddress) -> Result<Edge, AddressError> {
    edge_between(edge_tag::HAS_PARENT, child, parent)
}

/// `referrer` links to `referent`.
pub fn references_edge(referrer: &NodeAddress, referent: &NodeAddress) -> Result<Edge, AddressError> {
    edge_between(edge_tag::REFERENCES, referrer, referent)
}

/// `user` reacted to `post`.
pub fn reacts_edge(reaction: Reaction, user: &NodeAddress, post: &NodeAddress) -> Result<Edge, AddressError> {
    edge_between(reaction.tag(), user, post)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_prefixes_live_under_plugin_prefix() {
        let declaration = declaration().unwrap();
        assert_eq!(declaration.node_types.len(), 7);
        assert_eq!(declaration.edge_types.len(), 9);
        for node_type in &declaration.node_types {
            assert!(node_type.prefix.has_prefix(&declaration.node_prefix));
        }
        for edge_type in &declaration.edge_types {
            assert!(edge_type.prefix.has_prefix(&declaration.edge_prefix));
        }
    }

    #[test]
    fn test_addresses_resolve_to_declared_types() {
        let declaration = declaration().unwrap();
        let alice = user("alice").unwrap();
        let dependabot = bot("dependabot").unwrap();
        let issue = issue("acme", "widgets", 12).unwrap();

        assert_eq!(declaration.node_type(&alice).unwrap().name, "User");
        assert_eq!(declaration.node_type(&dependabot).unwrap().name, "Bot");
        assert_eq!(declaration.node_type(&issue).unwrap().default_weight, 2.0);

        let edge = reacts_edge(Reaction::Hooray, &alice, &issue).unwrap();
        let edge_type = declaration.edge_type(&edge.address).unwrap();
        assert_eq!(edge_type.forward_name, "reacted 🎉 to");
        assert_eq!(edge.src, alice);
        assert_eq!(edge.dst, issue);
    }

    #[test]
    fn test_edge_addresses_are_unambiguous() {
        // ["a","b"] -> ["c"] and ["a"] -> ["b","c"] share a flattened part list.
        let ab = NodeAddress::from_parts(["a", "b"]).unwrap();
        let c = NodeAddress::from_parts(["c"]).unwrap();
        let a = NodeAddress::from_parts(["a"]).unwrap();
        let bc = NodeAddress::from_parts(["b", "c"]).unwrap();

        let first = references_edge(&ab, &c).unwrap();
        let second = references_edge(&a, &bc).unwrap();
        assert_ne!(first.address, second.address);
    }
}
