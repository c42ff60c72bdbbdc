//! Repertoire move tree and variant enumeration.

use std::collections::HashMap;

use chess::PieceColor;
use serde::{Deserialize, Serialize};

use crate::variant::{opening_name, MoveNode, Variant};

/// A node of the repertoire tree. The root carries no move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveTreeNode {
    pub id: String,
    #[serde(default, alias = "move")]
    pub san: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_name: Option<String>,
    #[serde(default)]
    pub children: Vec<MoveTreeNode>,
}

impl MoveTreeNode {
    pub fn root(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            san: None,
            variant_name: None,
            children: Vec::new(),
        }
    }

    pub fn with_move(id: impl Into<String>, san: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            san: Some(san.into()),
            variant_name: None,
            children: Vec::new(),
        }
    }

    pub fn named(mut self, variant_name: impl Into<String>) -> Self {
        self.variant_name = Some(variant_name.into());
        self
    }

    pub fn child(mut self, child: MoveTreeNode) -> Self {
        self.children.push(child);
        self
    }
}

/// `GET /repertoires/{id}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repertoire {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub orientation: PieceColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_fen: Option<String>,
    pub move_nodes: MoveTreeNode,
}

impl Repertoire {
    pub fn start_fen(&self) -> &str {
        self.start_fen.as_deref().unwrap_or(chess::STARTING_FEN)
    }

    /// Every root-to-leaf line, depth first, with unique full names.
    pub fn variants(&self) -> Vec<Variant> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect(&self.move_nodes, &mut path, None, &mut out);

        let mut seen: HashMap<String, usize> = HashMap::new();
        for variant in &mut out {
            let n = seen.entry(variant.full_name.clone()).or_insert(0);
            *n += 1;
            if *n > 1 {
                let full_name = format!("{} ({n})", variant.full_name);
                variant.name = opening_name(&full_name);
                variant.full_name = full_name;
            }
        }
        out
    }
}

fn collect<'a>(
    node: &'a MoveTreeNode,
    path: &mut Vec<&'a MoveTreeNode>,
    name: Option<&'a str>,
    out: &mut Vec<Variant>,
) {
    let name = node.variant_name.as_deref().or(name);
    let has_move = node.san.is_some();
    if has_move {
        path.push(node);
    }

    if node.children.is_empty() {
        if !path.is_empty() {
            let moves: Vec<MoveNode> = path
                .iter()
                .filter_map(|n| n.san.as_ref().map(|san| MoveNode::new(n.id.clone(), san.clone())))
                .collect();
            let full_name = name.map_or_else(|| move_list(&moves), str::to_string);
            out.push(Variant::new(full_name, moves));
        }
    } else {
        for child in &node.children {
            collect(child, path, name, out);
        }
    }

    if has_move {
        path.pop();
    }
}

/// `1.e4 e5 2.Nf3` style label for an unnamed line.
fn move_list(moves: &[MoveNode]) -> String {
    moves
        .iter()
        .enumerate()
        .map(|(i, m)| {
            if i % 2 == 0 {
                format!("{}.{}", i / 2 + 1, m.san)
            } else {
                m.san.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
