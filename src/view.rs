//! Interaction state of one dashboard session: the selected category,
//! the selected top-N and the rank cursor used to inspect single records.

use crate::ranking::{rank_results, RankedEntry, RankedView, TopN};
use crate::results::ResultSet;
use crate::scoring::Category;

/// 1-based pointer into the current view. Never wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankCursor {
    rank: usize,
    total: usize,
}

impl Default for RankCursor {
    fn default() -> Self {
        RankCursor { rank: 1, total: 0 }
    }
}

impl RankCursor {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Adopt a new view size, keeping the rank where possible.
    pub fn clamp(&mut self, total: usize) {
        self.total = total;
        self.rank = self.rank.min(total).max(1);
    }

    pub fn previous(&mut self) {
        if self.rank > 1 {
            self.rank -= 1;
        }
    }

    pub fn next(&mut self) {
        if self.rank < self.total {
            self.rank += 1;
        }
    }

    pub fn at_first(&self) -> bool {
        self.rank <= 1
    }

    pub fn at_last(&self) -> bool {
        self.rank >= self.total
    }
}

/// Selections of one session. Owned by the interaction layer and passed in
/// explicitly; the ranking itself stays a pure function of
/// (results, category, top-N).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    category: Category,
    top_n: TopN,
    cursor: RankCursor,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState::new(Category::Overall, TopN::default())
    }
}

impl ViewState {
    pub fn new(category: Category, top_n: TopN) -> Self {
        ViewState {
            category,
            top_n,
            cursor: RankCursor::default(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn top_n(&self) -> TopN {
        self.top_n
    }

    pub fn rank(&self) -> usize {
        self.cursor.rank()
    }

    pub fn cursor(&self) -> &RankCursor {
        &self.cursor
    }

    /// Compute the view for the current selections.
    pub fn view<'a>(&self, results: &'a ResultSet) -> RankedView<'a> {
        rank_results(results, self.category, self.top_n)
    }

    /// Recompute after the results changed (e.g. a new upload) and re-clamp
    /// the cursor.
    pub fn refresh<'a>(&mut self, results: &'a ResultSet) -> RankedView<'a> {
        let view = self.view(results);
        self.cursor.clamp(view.len());
        view
    }

    pub fn select_category<'a>(
        &mut self,
        category: Category,
        results: &'a ResultSet,
    ) -> RankedView<'a> {
        self.category = category;
        self.refresh(results)
    }

    pub fn select_top_n<'a>(&mut self, top_n: TopN, results: &'a ResultSet) -> RankedView<'a> {
        self.top_n = top_n;
        self.refresh(results)
    }

    pub fn previous(&mut self) {
        self.cursor.previous();
    }

    pub fn next(&mut self) {
        self.cursor.next();
    }

    /// Entry under the cursor, if the view has any.
    pub fn current<'v, 'a>(&self, view: &'v RankedView<'a>) -> Option<&'v RankedEntry<'a>> {
        view.get(self.cursor.rank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{merge_tables, Cell, RawTable};

    fn results(count: usize) -> ResultSet {
        let rows = (0..count)
            .map(|i| {
                vec![
                    Cell::Text(format!("S{}", i)),
                    Cell::Text(format!("s{}@x.com", i)),
                    Cell::Number(i as f64),
                    Cell::Number((count - i) as f64),
                ]
            })
            .collect();
        let table = RawTable::new(
            "scores.csv",
            vec!["Student name".into(), "Email".into(), "Q1".into(), "Q81".into()],
            rows,
        );
        ResultSet::from_table(merge_tables(vec![table]).unwrap())
    }

    #[test]
    fn test_cursor_walks_to_both_ends() {
        let mut cursor = RankCursor::default();
        cursor.clamp(5);
        assert_eq!(cursor.rank(), 1);

        for _ in 0..4 {
            cursor.next();
        }
        assert_eq!(cursor.rank(), 5);
        assert!(cursor.at_last());
        cursor.next();
        assert_eq!(cursor.rank(), 5);

        for _ in 0..4 {
            cursor.previous();
        }
        assert_eq!(cursor.rank(), 1);
        assert!(cursor.at_first());
        cursor.previous();
        assert_eq!(cursor.rank(), 1);
    }

    #[test]
    fn test_cursor_empty_view() {
        let mut cursor = RankCursor::default();
        cursor.clamp(0);
        cursor.next();
        assert_eq!(cursor.rank(), 1);
        cursor.previous();
        assert_eq!(cursor.rank(), 1);
    }

    #[test]
    fn test_clamp_keeps_position_when_in_range() {
        let mut cursor = RankCursor::default();
        cursor.clamp(10);
        for _ in 0..6 {
            cursor.next();
        }
        assert_eq!(cursor.rank(), 7);

        cursor.clamp(20);
        assert_eq!(cursor.rank(), 7);
        cursor.clamp(5);
        assert_eq!(cursor.rank(), 5);
    }

    #[test]
    fn test_view_state_reclamps_on_top_n_change() {
        let set = results(30);
        let mut state = ViewState::new(Category::Overall, TopN::Count(20));
        let view = state.refresh(&set);
        assert_eq!(view.len(), 20);

        for _ in 0..14 {
            state.next();
        }
        assert_eq!(state.rank(), 15);

        let view = state.select_top_n(TopN::Count(10), &set);
        assert_eq!(view.len(), 10);
        assert_eq!(state.rank(), 10);

        let view = state.select_top_n(TopN::All, &set);
        assert_eq!(view.len(), 30);
        assert_eq!(state.rank(), 10);
    }

    #[test]
    fn test_current_follows_category() {
        let set = results(4);
        let mut state = ViewState::new(Category::Aptitude, TopN::All);
        let view = state.refresh(&set);
        assert_eq!(state.current(&view).unwrap().record.name(), "S3");

        let view = state.select_category(Category::DevOpsTesting, &set);
        assert_eq!(state.current(&view).unwrap().record.name(), "S0");
    }

    #[test]
    fn test_new_upload_reclamps_instead_of_resetting() {
        let mut state = ViewState::new(Category::Overall, TopN::All);
        let big = results(8);
        state.refresh(&big);
        for _ in 0..5 {
            state.next();
        }
        assert_eq!(state.rank(), 6);

        let small = results(3);
        state.refresh(&small);
        assert_eq!(state.rank(), 3);

        let bigger = results(12);
        state.refresh(&bigger);
        assert_eq!(state.rank(), 3);
    }
}
