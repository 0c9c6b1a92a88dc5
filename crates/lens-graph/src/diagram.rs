use std::collections::BTreeMap;
use std::fmt::Write;

use lens_types::{NodeKey, NodeKind};

use crate::context::GraphContext;

/// Render the discovered graph as a Mermaid flowchart.
///
/// Every node gets a stable id (`n0`, `n1`, ... in discovery order), every
/// link becomes one labelled edge. Link targets that were never visited,
/// such as the null address or nodes behind a stopper, are drawn as plain
/// address boxes.
pub fn render_mermaid(ctx: &GraphContext) -> String {
    let mut ids: BTreeMap<NodeKey, String> = BTreeMap::new();
    let mut out = String::from("graph LR\n");

    for node in ctx.nodes() {
        let id = format!("n{}", ids.len());
        let class = if node.stopper {
            ":::stopper"
        } else if node.kind == NodeKind::Invalid {
            ":::invalid"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "    {id}[\"{}<br/>{}\"]{class}",
            escape(&node.display_name),
            node.address.short()
        );
        ids.insert(node.address.clone(), id);
    }

    for link in ctx.links() {
        if !ids.contains_key(&link.to) {
            let id = format!("n{}", ids.len());
            let _ = writeln!(out, "    {id}[\"{}\"]", link.to.short());
            ids.insert(link.to.clone(), id);
        }
        let _ = writeln!(
            out,
            "    {} -->|{}| {}",
            ids[&link.from],
            escape(&link.name),
            ids[&link.to]
        );
    }

    out.push_str("    classDef stopper stroke-dasharray: 5 5\n");
    out.push_str("    classDef invalid fill:#fdd,stroke:#c33\n");
    out
}

fn escape(text: &str) -> String {
    text.replace('"', "#quot;").replace('|', "#124;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{LinkTarget, Node};
    use alloy_primitives::Address;

    fn key(b: u8) -> NodeKey {
        NodeKey::from_address(Address::repeat_byte(b))
    }

    #[test]
    fn renders_nodes_edges_and_classes() {
        let mut ctx = GraphContext::new();
        let mut root = Node::contract(key(1));
        root.display_name = "Vault".into();
        root.links.push(LinkTarget {
            to: key(2),
            name: "owner".into(),
        });
        root.links.push(LinkTarget {
            to: NodeKey::zero(),
            name: "pending|admin".into(),
        });
        let mut hub = Node::simple(key(2));
        hub.stopper = true;
        ctx.insert(root);
        ctx.insert(hub);
        ctx.insert(Node::invalid(NodeKey::new("bogus")));

        let diagram = render_mermaid(&ctx);
        assert!(diagram.starts_with("graph LR\n"));
        assert!(diagram.contains("n0[\"Vault<br/>"));
        assert!(diagram.contains(":::stopper"));
        assert!(diagram.contains("n2[\"bogus<br/>"));
        assert!(diagram.contains(":::invalid"));
        assert!(diagram.contains("n0 -->|owner| n1"));
        assert!(diagram.contains("n0 -->|pending#124;admin| n3"));
    }
}
