use std::collections::{HashMap, HashSet};

use bracken_parser::{
    types::{Document, FragmentDefinition, FragmentSpread},
    Pos, Positioned,
};

use crate::validation::visitor::{Visitor, VisitorContext};

/// The fragment-spread graph must be acyclic.
///
/// Spreads are gathered during the walk and a DFS over the graph runs once
/// at document exit; each back-edge produces one diagnostic at the cycle's
/// entry spread, listing the intermediate chain. Every fragment is visited
/// once, so the detection is linear in spreads.
#[derive(Default)]
pub struct NoFragmentCycles<'a> {
    current_fragment: Option<&'a str>,
    spreads: HashMap<&'a str, Vec<(&'a str, Pos)>>,
    fragment_order: Vec<&'a str>,
}

impl<'a> Visitor<'a> for NoFragmentCycles<'a> {
    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        fragment: &'a Positioned<FragmentDefinition>,
    ) {
        let name = fragment.node.name.node.as_str();
        self.current_fragment = Some(name);
        self.fragment_order.push(name);
    }

    fn exit_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a Positioned<FragmentDefinition>,
    ) {
        self.current_fragment = None;
    }

    fn enter_fragment_spread(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        fragment_spread: &'a Positioned<FragmentSpread>,
    ) {
        if let Some(current) = self.current_fragment {
            self.spreads
                .entry(current)
                .or_default()
                .push((
                    fragment_spread.node.fragment_name.node.as_str(),
                    fragment_spread.pos,
                ));
        }
    }

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, _doc: &'a Document) {
        let mut detector = CycleDetector {
            visited: HashSet::new(),
            spreads: &self.spreads,
            path_indices: HashMap::new(),
            errors: Vec::new(),
        };
        for fragment in self.fragment_order.iter().copied() {
            if !detector.visited.contains(fragment) {
                let mut path = Vec::new();
                detector.detect_from(fragment, &mut path);
            }
        }
        for (locations, message) in detector.errors {
            ctx.report_error(locations, message);
        }
    }
}

struct CycleDetector<'a, 'b> {
    visited: HashSet<&'a str>,
    spreads: &'b HashMap<&'a str, Vec<(&'a str, Pos)>>,
    path_indices: HashMap<&'a str, usize>,
    errors: Vec<(Vec<Pos>, String)>,
}

impl<'a, 'b> CycleDetector<'a, 'b> {
    fn detect_from(&mut self, from: &'a str, path: &mut Vec<(&'a str, Pos)>) {
        self.visited.insert(from);
        let Some(spreads) = self.spreads.get(from) else {
            return;
        };
        self.path_indices.insert(from, path.len());

        for (target, pos) in spreads {
            match self.path_indices.get(target) {
                Some(&index) => {
                    // A spread back into a fragment already on the stack:
                    // everything from that point forms the cycle.
                    let mut cycle: Vec<(&'a str, Pos)> = path[index..].to_vec();
                    cycle.push((target, *pos));
                    let via = cycle[..cycle.len() - 1]
                        .iter()
                        .map(|(name, _)| {
                            // Each stack entry records the spread *target*;
                            // the chain names are the intermediate targets.
                            *name
                        })
                        .collect::<Vec<_>>();
                    let message = if via.is_empty() {
                        format!("Cannot spread fragment \"{target}\" within itself")
                    } else {
                        format!(
                            "Cannot spread fragment \"{target}\" within itself via {}",
                            via.iter()
                                .map(|name| format!("\"{name}\""))
                                .collect::<Vec<_>>()
                                .join(", ")
                        )
                    };
                    self.errors
                        .push((cycle.iter().map(|(_, pos)| *pos).collect(), message));
                }
                None => {
                    if !self.visited.contains(target) {
                        path.push((target, *pos));
                        self.detect_from(target, path);
                        path.pop();
                    }
                }
            }
        }

        self.path_indices.remove(from);
    }
}
