use crate::coords::ClipRect;

use super::convert::VERTICES_PER_PRIMITIVE;

/// Contiguous vertex range drawn under one clip state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ClipRectRun {
    /// `None` draws with the scissor test disabled.
    pub clip_rect: Option<ClipRect>,
    pub start: usize,
    pub count: usize,
}

/// Groups `vertex_count` vertices into runs of equal clip state.
///
/// Vertices are scanned one primitive (six vertices) at a time. Consecutive
/// primitives merge only when their clip rects compare equal; nothing is
/// reordered. Missing entries in `clips` count as unclipped.
pub fn build_clip_runs(vertex_count: usize, clips: &[Option<ClipRect>], runs: &mut Vec<ClipRectRun>) {
    runs.clear();

    let mut start = 0;
    while start < vertex_count {
        let count = VERTICES_PER_PRIMITIVE.min(vertex_count - start);
        let clip = clips.get(start).copied().flatten();

        match runs.last_mut() {
            Some(run) if run.clip_rect == clip => run.count += count,
            _ => runs.push(ClipRectRun { clip_rect: clip, start, count }),
        }

        start += count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clips_for(groups: &[(Option<ClipRect>, usize)]) -> Vec<Option<ClipRect>> {
        groups
            .iter()
            .flat_map(|&(clip, prims)| std::iter::repeat_n(clip, prims * 6))
            .collect()
    }

    #[test]
    fn clipped_then_unclipped_gives_two_runs() {
        let c = Some(ClipRect::new(10, 10, 200, 100));
        let (n, m) = (5, 3);
        let clips = clips_for(&[(c, n), (None, m)]);

        let mut runs = Vec::new();
        build_clip_runs(clips.len(), &clips, &mut runs);

        assert_eq!(
            runs,
            vec![
                ClipRectRun { clip_rect: c, start: 0, count: 6 * n },
                ClipRectRun { clip_rect: None, start: 6 * n, count: 6 * m },
            ]
        );
    }

    #[test]
    fn equal_values_merge_even_if_built_separately() {
        let clips = clips_for(&[
            (Some(ClipRect::new(0, 0, 10, 10)), 1),
            (Some(ClipRect::new(0, 0, 10, 10)), 1),
        ]);
        let mut runs = Vec::new();
        build_clip_runs(clips.len(), &clips, &mut runs);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].count, 12);
    }

    #[test]
    fn non_adjacent_equal_clips_are_not_merged() {
        let x = Some(ClipRect::new(0, 0, 10, 10));
        let y = Some(ClipRect::new(5, 5, 10, 10));
        let clips = clips_for(&[(x, 1), (y, 1), (x, 1)]);

        let mut runs = Vec::new();
        build_clip_runs(clips.len(), &clips, &mut runs);

        let starts: Vec<_> = runs.iter().map(|r| (r.clip_rect, r.start)).collect();
        assert_eq!(starts, vec![(x, 0), (y, 6), (x, 12)]);
    }

    #[test]
    fn all_unclipped_is_one_run() {
        let clips = clips_for(&[(None, 4)]);
        let mut runs = Vec::new();
        build_clip_runs(clips.len(), &clips, &mut runs);
        assert_eq!(runs, vec![ClipRectRun { clip_rect: None, start: 0, count: 24 }]);
    }

    #[test]
    fn short_clip_table_treats_rest_as_unclipped() {
        let c = Some(ClipRect::new(1, 1, 1, 1));
        let clips = clips_for(&[(c, 1)]);
        let mut runs = Vec::new();
        build_clip_runs(12, &clips, &mut runs);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1], ClipRectRun { clip_rect: None, start: 6, count: 6 });
    }

    #[test]
    fn empty_input_clears_runs() {
        let mut runs = vec![ClipRectRun { clip_rect: None, start: 0, count: 6 }];
        build_clip_runs(0, &[], &mut runs);
        assert!(runs.is_empty());
    }
}
