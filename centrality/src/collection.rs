use std::collections::BTreeSet;

use shared_types::Point;

/// Ordered list of points where no two members share coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCollection {
    points: Vec<Point>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoveOutcome {
    pub moved: Vec<Point>,
    /// Already present in the destination; still in the source.
    pub rejected: Vec<Point>,
}

impl PointCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `point` unless a member already sits at the same coordinates.
    pub fn add(&mut self, point: Point) -> bool {
        if self.contains(&point) {
            return false;
        }
        self.points.push(point);
        true
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.points.iter().any(|p| p.same_position(point))
    }

    /// Removes every listed index in one step and returns the removed
    /// points in their original order. Out-of-range indexes are skipped.
    pub fn remove_at<I>(&mut self, indexes: I) -> Vec<Point>
    where
        I: IntoIterator<Item = usize>,
    {
        let selected = self.selection(indexes);

        // Highest first so earlier indexes stay valid.
        let mut removed: Vec<Point> = selected
            .iter()
            .rev()
            .map(|&idx| self.points.remove(idx))
            .collect();
        removed.reverse();
        removed
    }

    /// Moves the selected points to the end of `destination`, ascending by
    /// source index. Points whose coordinates already exist there stay put.
    pub fn move_to<I>(&mut self, indexes: I, destination: &mut PointCollection) -> MoveOutcome
    where
        I: IntoIterator<Item = usize>,
    {
        let selected = self.selection(indexes);
        let mut outcome = MoveOutcome::default();
        let mut accepted = BTreeSet::new();

        for idx in selected {
            let point = &self.points[idx];
            if destination.add(point.clone()) {
                accepted.insert(idx);
            } else {
                outcome.rejected.push(point.clone());
            }
        }

        outcome.moved = self.remove_at(accepted);
        outcome
    }

    fn selection<I>(&self, indexes: I) -> BTreeSet<usize>
    where
        I: IntoIterator<Item = usize>,
    {
        indexes
            .into_iter()
            .filter(|&idx| idx < self.points.len())
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, long: f64, label: &str) -> Point {
        Point::new(lat, long, label)
    }

    fn labels(collection: &PointCollection) -> Vec<&str> {
        collection.iter().map(|p| p.label.as_str()).collect()
    }

    fn filled(points: &[(f64, f64, &str)]) -> PointCollection {
        let mut collection = PointCollection::new();
        for &(lat, long, label) in points {
            assert!(collection.add(p(lat, long, label)));
        }
        collection
    }

    #[test]
    fn add_rejects_duplicate_coordinates() {
        let mut collection = PointCollection::new();
        assert!(collection.add(p(1.0, 2.0, "first")));
        assert!(!collection.add(p(1.0, 2.0, "same spot, other name")));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.get(0).unwrap().label, "first");
    }

    #[test]
    fn batch_remove_matches_sequential_remove() {
        let mut batch = filled(&[(0.0, 0.0, "a"), (0.0, 1.0, "b"), (0.0, 2.0, "c")]);
        let removed = batch.remove_at([0, 2]);

        let mut sequential = filled(&[(0.0, 0.0, "a"), (0.0, 1.0, "b"), (0.0, 2.0, "c")]);
        sequential.remove_at([2]);
        sequential.remove_at([0]);

        assert_eq!(batch, sequential);
        assert_eq!(labels(&batch), vec!["b"]);
        assert_eq!(
            removed.iter().map(|p| p.label.as_str()).collect::<Vec<_>>(),
            vec!["a", "c"]
        );
    }

    #[test]
    fn remove_ignores_out_of_range_and_repeated_indexes() {
        let mut collection = filled(&[(0.0, 0.0, "a"), (0.0, 1.0, "b")]);
        let removed = collection.remove_at([1, 1, 7, 99]);
        assert_eq!(removed.len(), 1);
        assert_eq!(labels(&collection), vec!["a"]);

        assert!(collection.remove_at(Vec::<usize>::new()).is_empty());
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn move_appends_in_source_order() {
        let mut source = filled(&[(0.0, 0.0, "a"), (0.0, 1.0, "b"), (0.0, 2.0, "c")]);
        let mut destination = filled(&[(5.0, 5.0, "z")]);

        let outcome = source.move_to([2, 0], &mut destination);

        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.moved.len(), 2);
        assert_eq!(labels(&source), vec!["b"]);
        assert_eq!(labels(&destination), vec!["z", "a", "c"]);
    }

    #[test]
    fn rejected_move_keeps_source_order() {
        let mut source = filled(&[(0.0, 0.0, "a"), (0.0, 1.0, "b"), (0.0, 2.0, "c")]);
        let mut destination = filled(&[(0.0, 1.0, "b elsewhere")]);

        let outcome = source.move_to([0, 1], &mut destination);

        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].label, "b");
        assert_eq!(outcome.moved.len(), 1);
        assert_eq!(labels(&source), vec!["b", "c"]);
        assert_eq!(labels(&destination), vec!["b elsewhere", "a"]);
    }

    #[test]
    fn fully_rejected_move_changes_nothing() {
        let mut source = filled(&[(0.0, 0.0, "a"), (0.0, 1.0, "b")]);
        let mut destination = filled(&[(0.0, 0.0, "a again")]);
        let before = (source.clone(), destination.clone());

        let outcome = source.move_to([0], &mut destination);

        assert!(outcome.moved.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!((source, destination), before);
    }
}
