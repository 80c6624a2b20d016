use quadmosaic::engine::tiles::{split_count, strip_lengths, tile_rects};
use quadmosaic::Rect;

#[test]
fn strip_lengths_sum_and_differ_by_at_most_one() {
    for total in [1usize, 7, 64, 99, 640, 1081] {
        for count in 1..=total.min(40) {
            let lengths = strip_lengths(total, count);
            assert_eq!(lengths.len(), count);
            assert_eq!(lengths.iter().sum::<usize>(), total, "{total}/{count}");
            let min = *lengths.iter().min().unwrap();
            let max = *lengths.iter().max().unwrap();
            assert!(max - min <= 1, "{total}/{count}: {lengths:?}");
        }
    }
}

#[test]
fn square_leaf_on_wide_frame() {
    // 1920 / 1080 = 1.78, 1.78^2 = 3.16 > 1 * 2
    assert_eq!(split_count(Rect::new(0, 0, 1920, 1080), 1.0), 2);
    // 1280 / 1080 = 1.19, 1.40 < 2
    assert_eq!(split_count(Rect::new(0, 0, 1280, 1080), 1.0), 1);
    assert_eq!(split_count(Rect::new(0, 0, 64, 64), 1.0), 1);
}

#[test]
fn leaf_aspect_scales_strip_count() {
    // A 16:9 leaf already matches a 16:9 frame.
    assert_eq!(split_count(Rect::new(0, 0, 1920, 1080), 16.0 / 9.0), 1);
    // Tall frame, wide leaf: long / (short * 1/2) = 4
    assert_eq!(split_count(Rect::new(0, 0, 100, 200), 2.0), 4);
}

#[test]
fn split_count_is_clamped() {
    assert_eq!(split_count(Rect::new(0, 0, 5, 1), 0.001), 5);
    assert_eq!(split_count(Rect::new(0, 0, 10, 10), 1000.0), 1);
    assert_eq!(split_count(Rect::new(0, 0, 10, 10), f64::NAN), 1);
}

#[test]
fn tiles_cover_bounds_without_overlap() {
    let bounds = Rect::new(3, 5, 301, 97);
    let tiles = tile_rects(bounds, 1.0);
    assert_eq!(tiles.len(), 3);
    assert_eq!(tiles.iter().map(Rect::area).sum::<usize>(), bounds.area());

    let mut x = bounds.x;
    for tile in &tiles {
        assert_eq!(tile.x, x);
        assert_eq!((tile.y, tile.height), (bounds.y, bounds.height));
        x = tile.right();
    }
    assert_eq!(x, bounds.right());
}
