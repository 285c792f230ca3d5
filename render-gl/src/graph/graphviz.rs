//! Graphviz export of the task/resource graph.

use std::io::{self, Write};

use crate::graph::task::TaskKind;
use crate::graph::{FrameGraph, ResourceNode};

impl FrameGraph {
    /// Dumps the declared graph in dot format: resources colored by
    /// transient/external/captured, tasks orange, edges by produce, write
    /// and read.
    pub fn export_graphviz(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "digraph framegraph \n{{")?;
        writeln!(out, "rankdir = LR")?;
        writeln!(out, "bgcolor = black\n")?;
        writeln!(
            out,
            "node [shape=rectangle, fontname=\"helvetica\", fontsize=12]\n"
        )?;

        for resource in &self.resources {
            let color = resource_color(resource);
            writeln!(
                out,
                "\"{}\" [label=\"{}\\nRefs: {}\\nID: {}\", style=filled, fillcolor={}]",
                resource.name, resource.name, resource.ref_count, resource.id, color
            )?;
        }
        writeln!(out)?;

        for task in &self.tasks {
            let kind = match task.kind {
                TaskKind::Pass(_) => "pass",
                TaskKind::Custom(_) => "custom",
            };
            writeln!(
                out,
                "\"{}\" [label=\"{}\\n({})\\nRefs: {}\", style=filled, fillcolor=darkorange]",
                task.name, task.name, kind, task.ref_count
            )?;

            if !task.produced.is_empty() {
                write!(out, "\"{}\" -> {{ ", task.name)?;
                for &r in &task.produced {
                    write!(out, "\"{}\" ", self.resources[r.0].name)?;
                }
                writeln!(out, "}} [color=seagreen]")?;
            }

            if !task.writes.is_empty() || !task.read_writes.is_empty() {
                write!(out, "\"{}\" -> {{ ", task.name)?;
                for &r in task.writes.iter().chain(task.read_writes.iter()) {
                    write!(out, "\"{}\" ", self.resources[r.0].name)?;
                }
                writeln!(out, "}} [color=gold]")?;
            }
        }
        writeln!(out)?;

        for resource in &self.resources {
            if resource.readers.is_empty() {
                continue;
            }
            write!(out, "\"{}\" -> {{ ", resource.name)?;
            for &reader in &resource.readers {
                write!(out, "\"{}\" ", self.tasks[reader].name)?;
            }
            writeln!(out, "}} [color=skyblue]")?;
        }

        writeln!(out, "}}")
    }
}

fn resource_color(resource: &ResourceNode) -> &'static str {
    if resource.captured {
        "yellow"
    } else if resource.is_transient() {
        "skyblue"
    } else {
        "steelblue"
    }
}
