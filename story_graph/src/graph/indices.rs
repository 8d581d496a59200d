//! Graph indices - by-source grouping and adjacency sets.

use std::collections::{BTreeSet, HashMap};

use story_model::{Choice, SceneId};

static NO_SCENES: BTreeSet<SceneId> = BTreeSet::new();

/// Lookup tables derived from a set of choices.
///
/// Always exactly what [`rebuild_indices`] returns for the current choices;
/// callers never mutate it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphIndices {
    /// Source scene -> outgoing choices, sorted by `order_index` then id.
    choices_by_scene: HashMap<SceneId, Vec<Choice>>,

    /// Scene -> scenes with an edge into it.
    predecessors: HashMap<SceneId, BTreeSet<SceneId>>,

    /// Scene -> scenes one outgoing edge away.
    successors: HashMap<SceneId, BTreeSet<SceneId>>,
}

/// Build all three indices in a single pass over `choices`.
pub fn rebuild_indices(choices: &[Choice]) -> GraphIndices {
    let mut indices = GraphIndices::default();

    for choice in choices {
        let source = choice.source_scene_id;
        let target = choice.target_scene_id;

        indices
            .choices_by_scene
            .entry(source)
            .or_default()
            .push(choice.clone());
        indices.successors.entry(source).or_default().insert(target);
        indices.predecessors.entry(target).or_default().insert(source);
    }

    for outgoing in indices.choices_by_scene.values_mut() {
        outgoing.sort_by(|a, b| {
            a.order_index
                .cmp(&b.order_index)
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    indices
}

impl GraphIndices {
    /// Outgoing choices of a scene in display order. Empty for unknown scenes.
    pub fn choices_for_scene(&self, scene_id: SceneId) -> &[Choice] {
        self.choices_by_scene
            .get(&scene_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Scenes with a choice leading into `scene_id`.
    pub fn predecessors(&self, scene_id: SceneId) -> &BTreeSet<SceneId> {
        self.predecessors.get(&scene_id).unwrap_or(&NO_SCENES)
    }

    /// Scenes reachable from `scene_id` by one choice.
    pub fn successors(&self, scene_id: SceneId) -> &BTreeSet<SceneId> {
        self.successors.get(&scene_id).unwrap_or(&NO_SCENES)
    }

    pub fn has_incoming(&self, scene_id: SceneId) -> bool {
        !self.predecessors(scene_id).is_empty()
    }

    pub fn has_outgoing(&self, scene_id: SceneId) -> bool {
        !self.choices_for_scene(scene_id).is_empty()
    }

    /// Number of choices indexed.
    pub fn edge_count(&self) -> usize {
        self.choices_by_scene.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use story_model::ChoiceId;
    use uuid::Uuid;

    fn scene(n: u128) -> SceneId {
        SceneId::from_uuid(Uuid::from_u128(n))
    }

    fn choice(id: u128, from: u128, to: u128, order: i64) -> Choice {
        Choice::new(scene(from), scene(to), format!("choice {}", id))
            .with_id(ChoiceId::from_uuid(Uuid::from_u128(id)))
            .with_order_index(order)
    }

    #[test]
    fn test_empty_indices() {
        let indices = rebuild_indices(&[]);

        assert!(indices.choices_for_scene(scene(1)).is_empty());
        assert!(indices.predecessors(scene(1)).is_empty());
        assert!(indices.successors(scene(1)).is_empty());
        assert_eq!(indices.edge_count(), 0);
    }

    #[test]
    fn test_order_index_then_id_tie_break() {
        // ids a < b < c with order_index 2, 1, 1
        let a = choice(0xa, 1, 2, 2);
        let b = choice(0xb, 1, 3, 1);
        let c = choice(0xc, 1, 4, 1);

        let indices = rebuild_indices(&[a.clone(), b.clone(), c.clone()]);
        let ids: Vec<_> = indices
            .choices_for_scene(scene(1))
            .iter()
            .map(|c| c.id)
            .collect();

        assert_eq!(ids, vec![b.id, c.id, a.id]);
    }

    #[test]
    fn test_adjacency() {
        let indices =
            rebuild_indices(&[choice(1, 1, 2, 0), choice(2, 1, 3, 1), choice(3, 3, 2, 0)]);

        assert_eq!(
            indices.successors(scene(1)),
            &BTreeSet::from([scene(2), scene(3)])
        );
        assert_eq!(
            indices.predecessors(scene(2)),
            &BTreeSet::from([scene(1), scene(3)])
        );
        assert!(indices.predecessors(scene(1)).is_empty());
        assert!(!indices.has_incoming(scene(1)));
        assert!(indices.has_outgoing(scene(3)));
        assert!(!indices.has_outgoing(scene(2)));
    }

    #[test]
    fn test_parallel_edges_collapse_in_sets() {
        let indices = rebuild_indices(&[choice(1, 1, 2, 0), choice(2, 1, 2, 1)]);

        assert_eq!(indices.choices_for_scene(scene(1)).len(), 2);
        assert_eq!(indices.successors(scene(1)).len(), 1);
        assert_eq!(indices.predecessors(scene(2)).len(), 1);
    }

    #[test]
    fn test_self_loop() {
        let indices = rebuild_indices(&[choice(1, 5, 5, 0)]);

        assert!(indices.successors(scene(5)).contains(&scene(5)));
        assert!(indices.predecessors(scene(5)).contains(&scene(5)));
    }

    fn arb_choices() -> impl Strategy<Value = Vec<Choice>> {
        prop::collection::vec((0u8..8, 0u8..8, -3i64..3), 0..40).prop_map(|edges| {
            edges
                .into_iter()
                .enumerate()
                .map(|(i, (from, to, order))| {
                    choice(1000 + i as u128, u128::from(from), u128::from(to), order)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_rebuild_is_deterministic(choices in arb_choices()) {
            prop_assert_eq!(rebuild_indices(&choices), rebuild_indices(&choices));
        }

        #[test]
        fn prop_rebuild_ignores_input_order(choices in arb_choices()) {
            let mut reversed = choices.clone();
            reversed.reverse();
            prop_assert_eq!(rebuild_indices(&choices), rebuild_indices(&reversed));
        }

        #[test]
        fn prop_every_choice_is_indexed(choices in arb_choices()) {
            let indices = rebuild_indices(&choices);
            prop_assert_eq!(indices.edge_count(), choices.len());
            for c in &choices {
                prop_assert!(indices.choices_for_scene(c.source_scene_id).contains(c));
                prop_assert!(indices.successors(c.source_scene_id).contains(&c.target_scene_id));
                prop_assert!(indices.predecessors(c.target_scene_id).contains(&c.source_scene_id));
            }
        }

        #[test]
        fn prop_no_edges_means_empty_sets(choices in arb_choices()) {
            let indices = rebuild_indices(&choices);
            for n in 0u128..8 {
                let s = scene(n);
                let incoming = choices.iter().any(|c| c.target_scene_id == s);
                let outgoing = choices.iter().any(|c| c.source_scene_id == s);
                prop_assert_eq!(indices.predecessors(s).is_empty(), !incoming);
                prop_assert_eq!(indices.successors(s).is_empty(), !outgoing);
            }
        }

        #[test]
        fn prop_outgoing_choices_are_sorted(choices in arb_choices()) {
            let indices = rebuild_indices(&choices);
            for n in 0u128..8 {
                let outgoing = indices.choices_for_scene(scene(n));
                for pair in outgoing.windows(2) {
                    let key = |c: &Choice| (c.order_index, c.id);
                    prop_assert!(key(&pair[0]) < key(&pair[1]));
                }
            }
        }
    }
}
