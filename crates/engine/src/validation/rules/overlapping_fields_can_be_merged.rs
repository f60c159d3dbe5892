use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use bracken_parser::{
    types::{Document, Field, FragmentDefinition, Selection, SelectionSet},
    Positioned,
};
use indexmap::IndexMap;

use crate::{
    registry::{MetaField, MetaType, MetaTypeName, Registry},
    validation::visitor::{RuleError, Visitor, VisitorContext},
};

/// Two fields selected under the same response key must be mergeable: same
/// field name, equal arguments, compatible return-type shapes, and
/// recursively mergeable sub-selections.
///
/// Conflicts are enumerated pair-wise. Fragment pairs and collected
/// selection sets are memoized, keeping the work quadratic in field count
/// rather than exponential in spread depth.
#[derive(Default)]
pub struct OverlappingFieldsCanBeMerged<'a> {
    fragments: HashMap<&'a str, &'a FragmentDefinition>,
    compared_fragment_pairs: PairSet<'a>,
    collected: HashMap<usize, Rc<Collected<'a>>>,
}

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged<'a> {
    fn enter_document(&mut self, _ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        for fragment in &doc.fragments {
            self.fragments
                .entry(fragment.node.name.node.as_str())
                .or_insert(&fragment.node);
        }
    }

    fn enter_selection_set(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        selection_set: &'a Positioned<SelectionSet>,
    ) {
        let mut checker = Checker {
            registry: ctx.registry,
            fragments: &self.fragments,
            collected: &mut self.collected,
            compared_fragment_pairs: &mut self.compared_fragment_pairs,
            errors: Vec::new(),
        };
        checker.find_conflicts_within_selection_set(ctx.current_type(), &selection_set.node);
        for error in checker.errors {
            ctx.report_error(error.locations, error.message);
        }
    }
}

#[derive(Clone, Copy)]
struct FieldEntry<'a> {
    parent_type: Option<&'a MetaType>,
    field: &'a Positioned<Field>,
    field_def: Option<&'a MetaField>,
}

type FieldMap<'a> = IndexMap<&'a str, Vec<FieldEntry<'a>>>;
type Collected<'a> = (FieldMap<'a>, Vec<&'a str>);

/// Remembers which fragment pairs were already compared. A pair compared
/// without mutual exclusivity subsumes the exclusive comparison, but not
/// the other way around.
#[derive(Default)]
struct PairSet<'a> {
    pairs: HashMap<(&'a str, &'a str), bool>,
}

impl<'a> PairSet<'a> {
    fn contains(&self, a: &'a str, b: &'a str, mutually_exclusive: bool) -> bool {
        let key = if a <= b { (a, b) } else { (b, a) };
        match self.pairs.get(&key) {
            Some(false) => true,
            Some(true) => mutually_exclusive,
            None => false,
        }
    }

    fn insert(&mut self, a: &'a str, b: &'a str, mutually_exclusive: bool) {
        let key = if a <= b { (a, b) } else { (b, a) };
        self.pairs.insert(key, mutually_exclusive);
    }
}

struct Checker<'a, 'b> {
    registry: &'a Registry,
    fragments: &'b HashMap<&'a str, &'a FragmentDefinition>,
    collected: &'b mut HashMap<usize, Rc<Collected<'a>>>,
    compared_fragment_pairs: &'b mut PairSet<'a>,
    errors: Vec<RuleError>,
}

impl<'a, 'b> Checker<'a, 'b> {
    fn find_conflicts_within_selection_set(
        &mut self,
        parent_type: Option<&'a MetaType>,
        selection_set: &'a SelectionSet,
    ) {
        let collected = self.collect_fields_and_fragments(parent_type, selection_set);
        let (field_map, fragment_names) = &*collected;

        self.collect_conflicts_within(field_map);

        for (index, fragment_name) in fragment_names.iter().enumerate() {
            let mut visited = HashSet::new();
            self.collect_conflicts_between_fields_and_fragment(
                field_map,
                fragment_name,
                false,
                &mut visited,
            );
            for other in &fragment_names[index + 1..] {
                self.collect_conflicts_between_fragments(fragment_name, other, false);
            }
        }
    }

    fn collect_fields_and_fragments(
        &mut self,
        parent_type: Option<&'a MetaType>,
        selection_set: &'a SelectionSet,
    ) -> Rc<Collected<'a>> {
        let key = selection_set as *const SelectionSet as usize;
        if let Some(collected) = self.collected.get(&key) {
            return Rc::clone(collected);
        }
        let mut field_map = FieldMap::default();
        let mut fragment_names = Vec::new();
        self.walk_selection_set(parent_type, selection_set, &mut field_map, &mut fragment_names);
        let collected = Rc::new((field_map, fragment_names));
        self.collected.insert(key, Rc::clone(&collected));
        collected
    }

    fn walk_selection_set(
        &self,
        parent_type: Option<&'a MetaType>,
        selection_set: &'a SelectionSet,
        field_map: &mut FieldMap<'a>,
        fragment_names: &mut Vec<&'a str>,
    ) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    let field_def = parent_type
                        .and_then(|ty| ty.field_by_name(field.node.name.node.as_str()));
                    field_map
                        .entry(field.node.response_key().node.as_str())
                        .or_default()
                        .push(FieldEntry {
                            parent_type,
                            field,
                            field_def,
                        });
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();
                    if !fragment_names.contains(&name) {
                        fragment_names.push(name);
                    }
                }
                Selection::InlineFragment(inline) => {
                    let fragment_type = match &inline.node.type_condition {
                        Some(condition) => {
                            self.registry.lookup_type(condition.node.on.node.as_str())
                        }
                        None => parent_type,
                    };
                    self.walk_selection_set(
                        fragment_type,
                        &inline.node.selection_set.node,
                        field_map,
                        fragment_names,
                    );
                }
            }
        }
    }

    fn collect_conflicts_within(&mut self, field_map: &FieldMap<'a>) {
        for (response_key, entries) in field_map {
            for (index, entry) in entries.iter().enumerate() {
                for other in &entries[index + 1..] {
                    self.find_conflict(response_key, *entry, *other, false);
                }
            }
        }
    }

    fn collect_conflicts_between(
        &mut self,
        field_map_a: &FieldMap<'a>,
        field_map_b: &FieldMap<'a>,
        mutually_exclusive: bool,
    ) {
        for (response_key, entries_a) in field_map_a {
            let Some(entries_b) = field_map_b.get(response_key) else {
                continue;
            };
            for entry_a in entries_a {
                for entry_b in entries_b {
                    self.find_conflict(response_key, *entry_a, *entry_b, mutually_exclusive);
                }
            }
        }
    }

    fn collect_conflicts_between_fields_and_fragment(
        &mut self,
        field_map: &FieldMap<'a>,
        fragment_name: &'a str,
        mutually_exclusive: bool,
        visited: &mut HashSet<&'a str>,
    ) {
        if !visited.insert(fragment_name) {
            return;
        }
        let Some(fragment) = self.fragments.get(fragment_name) else {
            return;
        };
        let fragment_type = self
            .registry
            .lookup_type(fragment.type_condition.node.on.node.as_str());
        let collected =
            self.collect_fields_and_fragments(fragment_type, &fragment.selection_set.node);
        let (fragment_fields, nested_fragments) = &*collected;

        self.collect_conflicts_between(field_map, fragment_fields, mutually_exclusive);
        for nested in nested_fragments {
            self.collect_conflicts_between_fields_and_fragment(
                field_map,
                nested,
                mutually_exclusive,
                visited,
            );
        }
    }

    fn collect_conflicts_between_fragments(
        &mut self,
        fragment_a: &'a str,
        fragment_b: &'a str,
        mutually_exclusive: bool,
    ) {
        if fragment_a == fragment_b {
            return;
        }
        if self
            .compared_fragment_pairs
            .contains(fragment_a, fragment_b, mutually_exclusive)
        {
            return;
        }
        self.compared_fragment_pairs
            .insert(fragment_a, fragment_b, mutually_exclusive);

        let (Some(def_a), Some(def_b)) = (
            self.fragments.get(fragment_a).copied(),
            self.fragments.get(fragment_b).copied(),
        ) else {
            return;
        };
        let type_a = self
            .registry
            .lookup_type(def_a.type_condition.node.on.node.as_str());
        let type_b = self
            .registry
            .lookup_type(def_b.type_condition.node.on.node.as_str());
        let collected_a = self.collect_fields_and_fragments(type_a, &def_a.selection_set.node);
        let collected_b = self.collect_fields_and_fragments(type_b, &def_b.selection_set.node);

        self.collect_conflicts_between(&collected_a.0, &collected_b.0, mutually_exclusive);
        for nested in &collected_b.1 {
            self.collect_conflicts_between_fragments(fragment_a, nested, mutually_exclusive);
        }
        for nested in &collected_a.1 {
            self.collect_conflicts_between_fragments(nested, fragment_b, mutually_exclusive);
        }
    }

    fn find_conflict(
        &mut self,
        response_key: &str,
        entry_a: FieldEntry<'a>,
        entry_b: FieldEntry<'a>,
        parents_mutually_exclusive: bool,
    ) {
        if std::ptr::eq(entry_a.field, entry_b.field) {
            return;
        }

        // Fields on distinct object types can never coexist on one response
        // object, so only their output shapes need to agree.
        let mutually_exclusive = parents_mutually_exclusive
            || match (entry_a.parent_type, entry_b.parent_type) {
                (Some(a), Some(b)) => {
                    a.name() != b.name()
                        && matches!(a, MetaType::Object(_))
                        && matches!(b, MetaType::Object(_))
                }
                _ => false,
            };

        if !mutually_exclusive {
            let name_a = entry_a.field.node.name.node.as_str();
            let name_b = entry_b.field.node.name.node.as_str();
            if name_a != name_b {
                self.report(
                    response_key,
                    format!("{name_a} and {name_b} are different fields"),
                    entry_a,
                    entry_b,
                );
                return;
            }
            if !same_arguments(&entry_a.field.node, &entry_b.field.node) {
                self.report(
                    response_key,
                    "they have differing arguments".to_string(),
                    entry_a,
                    entry_b,
                );
                return;
            }
        }

        if let (Some(def_a), Some(def_b)) = (entry_a.field_def, entry_b.field_def) {
            if do_types_conflict(self.registry, def_a.ty.as_str(), def_b.ty.as_str()) {
                self.report(
                    response_key,
                    format!(
                        "they return conflicting types {} and {}",
                        def_a.ty, def_b.ty
                    ),
                    entry_a,
                    entry_b,
                );
                return;
            }
        }

        if !entry_a.field.node.selection_set.node.items.is_empty()
            || !entry_b.field.node.selection_set.node.items.is_empty()
        {
            self.find_conflicts_between_sub_selection_sets(entry_a, entry_b, mutually_exclusive);
        }
    }

    fn find_conflicts_between_sub_selection_sets(
        &mut self,
        entry_a: FieldEntry<'a>,
        entry_b: FieldEntry<'a>,
        mutually_exclusive: bool,
    ) {
        let type_a = entry_a
            .field_def
            .and_then(|def| self.registry.concrete_type_by_name(def.ty.as_str()));
        let type_b = entry_b
            .field_def
            .and_then(|def| self.registry.concrete_type_by_name(def.ty.as_str()));

        let collected_a = self
            .collect_fields_and_fragments(type_a, &entry_a.field.node.selection_set.node);
        let collected_b = self
            .collect_fields_and_fragments(type_b, &entry_b.field.node.selection_set.node);

        self.collect_conflicts_between(&collected_a.0, &collected_b.0, mutually_exclusive);

        for fragment_name in &collected_b.1 {
            let mut visited = HashSet::new();
            self.collect_conflicts_between_fields_and_fragment(
                &collected_a.0,
                fragment_name,
                mutually_exclusive,
                &mut visited,
            );
        }
        for fragment_name in &collected_a.1 {
            let mut visited = HashSet::new();
            self.collect_conflicts_between_fields_and_fragment(
                &collected_b.0,
                fragment_name,
                mutually_exclusive,
                &mut visited,
            );
        }
        for fragment_a in &collected_a.1 {
            for fragment_b in &collected_b.1 {
                self.collect_conflicts_between_fragments(fragment_a, fragment_b, mutually_exclusive);
            }
        }
    }

    fn report(
        &mut self,
        response_key: &str,
        reason: String,
        entry_a: FieldEntry<'a>,
        entry_b: FieldEntry<'a>,
    ) {
        self.errors.push(RuleError::new(
            vec![entry_a.field.pos, entry_b.field.pos],
            format!(
                "Fields \"{response_key}\" conflict because {reason}. Use different aliases on the fields to fetch both if this was intentional"
            ),
        ));
    }
}

fn same_arguments(a: &Field, b: &Field) -> bool {
    if a.arguments.len() != b.arguments.len() {
        return false;
    }
    a.arguments.iter().all(|(name, value)| {
        b.arguments
            .iter()
            .any(|(other_name, other_value)| {
                name.node == other_name.node && value.node == other_value.node
            })
    })
}

/// Whether two return types can never produce the same response shape.
/// Composite named types are not compared here; their subfields are checked
/// structurally instead.
fn do_types_conflict(registry: &Registry, a: &str, b: &str) -> bool {
    match (MetaTypeName::create(a), MetaTypeName::create(b)) {
        (MetaTypeName::NonNull(a), MetaTypeName::NonNull(b)) => {
            do_types_conflict(registry, a, b)
        }
        (MetaTypeName::NonNull(_), _) | (_, MetaTypeName::NonNull(_)) => true,
        (MetaTypeName::List(a), MetaTypeName::List(b)) => do_types_conflict(registry, a, b),
        (MetaTypeName::List(_), _) | (_, MetaTypeName::List(_)) => true,
        (MetaTypeName::Named(a), MetaTypeName::Named(b)) => {
            let a_is_leaf = registry
                .lookup_type(a)
                .map(MetaType::is_leaf)
                .unwrap_or(false);
            let b_is_leaf = registry
                .lookup_type(b)
                .map(MetaType::is_leaf)
                .unwrap_or(false);
            (a_is_leaf || b_is_leaf) && a != b
        }
    }
}
