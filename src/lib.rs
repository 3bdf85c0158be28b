#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs, unreachable_pub)]
/*!

`breadboard`

The logic engine behind a gate-level circuit sandbox: a cycle-tolerant
circuit graph, a bounded fixed-point simulator over three-valued signals,
a boolean expression compiler and deriver, and a truth-table enumerator.
Rendering, hit-testing and event handling are left to the embedding
editor, which drives everything through [netlist::Circuit].

*/
#![doc = "## Simple Example\n```"]
#![doc = include_str!("../demos/simple.rs")]
#![doc = "\n```"]

pub mod circuit;
pub mod derive;
pub mod expr;
pub mod graph;
pub mod netlist;
pub mod sim;
pub mod table;
pub mod util;
