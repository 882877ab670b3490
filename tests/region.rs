use waybitmaps::{Rect, Region};

fn rect(x: f64, y: f64, w: f64, h: f64) -> Rect {
    Rect::new(x, y, w, h)
}

#[test]
fn new_region_is_nil() {
    let region = Region::new();
    assert!(region.is_nil());
    assert!(region.rects().is_empty());
    assert!(region.extents().is_empty());
    assert!(!region.contains_point(0.0, 0.0));
}

#[test]
fn extents_track_every_add() {
    let mut region = Region::new();

    region.add_rect(rect(10.0, 20.0, 30.0, 40.0));
    assert_eq!(region.extents(), rect(10.0, 20.0, 30.0, 40.0));

    region.add_rect(rect(0.0, 0.0, 5.0, 5.0));
    assert_eq!(region.extents(), rect(0.0, 0.0, 40.0, 60.0));

    region.add_rect(rect(100.0, 5.0, 10.0, 10.0));
    assert_eq!(region.extents(), rect(0.0, 0.0, 110.0, 60.0));
    assert_eq!(region.rects().len(), 3);
}

#[test]
fn degenerate_rects_are_ignored() {
    let mut region = Region::new();
    region.add_rect(rect(0.0, 0.0, 0.0, 10.0));
    region.add_rect(rect(0.0, 0.0, 10.0, -1.0));
    assert!(region.is_nil());
}

#[test]
fn clear_resets_extents_and_is_idempotent() {
    let mut region = Region::new();
    region.add_rect(rect(1.0, 2.0, 3.0, 4.0));
    region.clear();
    assert!(region.is_nil());
    assert!(region.extents().is_empty());
    region.clear();
    assert!(region.is_nil());
}

#[test]
fn contains_point_is_half_open() {
    let mut region = Region::new();
    region.add_rect(rect(0.0, 0.0, 100.0, 100.0));
    region.add_rect(rect(150.0, 150.0, 50.0, 50.0));

    assert!(region.contains_point(10.0, 10.0));
    assert!(region.contains_point(0.0, 0.0));
    assert!(region.contains_point(199.0, 199.0));
    assert!(!region.contains_point(200.0, 200.0));
    assert!(!region.contains_point(100.0, 100.0));
    assert!(!region.contains_point(120.0, 120.0)); // inside extents, outside both rects
}

#[test]
fn intersect_rect_clips_pairwise() {
    let mut region = Region::new();
    region.add_rect(rect(0.0, 0.0, 100.0, 100.0));
    region.add_rect(rect(150.0, 150.0, 50.0, 50.0));

    let clipped = region.intersect_rect(&rect(90.0, 90.0, 20.0, 20.0));
    assert_eq!(clipped.rects(), &[rect(90.0, 90.0, 10.0, 10.0)]);
    assert_eq!(clipped.extents(), rect(90.0, 90.0, 10.0, 10.0));

    let miss = region.intersect_rect(&rect(110.0, 0.0, 30.0, 30.0));
    assert!(miss.is_nil());
}

#[test]
fn intersect_commutes() {
    let mut a = Region::new();
    a.add_rect(rect(0.0, 0.0, 10.0, 10.0));
    a.add_rect(rect(5.0, 5.0, 10.0, 10.0));
    let mut b = Region::new();
    b.add_rect(rect(8.0, 2.0, 10.0, 6.0));
    b.add_rect(rect(-3.0, -3.0, 5.0, 5.0));

    let ab = Region::intersect(&a, &b);
    let ba = Region::intersect(&b, &a);

    // same point set, sampled over the joint extents
    for ix in -5..25 {
        for iy in -5..25 {
            let (x, y) = (f64::from(ix) + 0.5, f64::from(iy) + 0.5);
            assert_eq!(ab.contains_point(x, y), ba.contains_point(x, y), "at {x},{y}");
        }
    }
    assert_eq!(ab.extents(), ba.extents());
}

#[test]
fn intersect_of_disjoint_regions_is_nil() {
    let mut a = Region::new();
    a.add_rect(rect(0.0, 0.0, 10.0, 10.0));
    let mut b = Region::new();
    b.add_rect(rect(20.0, 20.0, 10.0, 10.0));
    assert!(Region::intersect(&a, &b).is_nil());
}

#[test]
fn union_keeps_overlapping_entries() {
    let mut dst = Region::new();
    dst.add_rect(rect(0.0, 0.0, 10.0, 10.0));
    let mut src = Region::new();
    src.add_rect(rect(5.0, 5.0, 10.0, 10.0));
    src.add_rect(rect(30.0, 0.0, 5.0, 5.0));

    dst.union(&src);
    // no canonicalization: all three entries survive
    assert_eq!(dst.rects().len(), 3);
    assert_eq!(dst.extents(), rect(0.0, 0.0, 35.0, 15.0));
    assert!(dst.contains_point(7.0, 7.0));
    assert!(dst.contains_point(12.0, 12.0));
    assert!(dst.contains_point(32.0, 2.0));
    assert!(!dst.contains_point(20.0, 20.0));
}

#[test]
fn to_string_round_trips() {
    let mut region = Region::new();
    region.add_rect(rect(0.0, 0.0, 100.0, 100.0));
    region.add_rect(rect(150.0, 150.0, 50.0, 50.0));

    let text = region.to_string();
    let parsed: Region = text.parse().unwrap();
    assert_eq!(parsed.rects(), region.rects());
    assert_eq!(parsed.extents(), region.extents());
}

#[test]
fn to_string_format_is_stable() {
    let mut region = Region::new();
    region.add_rect(rect(1.0, 2.0, 3.0, 4.5));
    assert_eq!(
        region.to_string(),
        "{\n[1.000000,2.000000,3.000000,4.500000]\n}"
    );

    let two = {
        let mut r = region.clone();
        r.add_rect(rect(5.0, 6.0, 7.0, 8.0));
        r.to_string()
    };
    assert_eq!(
        two,
        "{\n[1.000000,2.000000,3.000000,4.500000],\n[5.000000,6.000000,7.000000,8.000000]\n}"
    );
}

#[test]
fn empty_region_round_trips() {
    let region = Region::new();
    assert_eq!(region.to_string(), "{\n}");
    let parsed: Region = "{\n}".parse().unwrap();
    assert!(parsed.is_nil());
}

#[test]
fn parse_accepts_loose_input() {
    let parsed: Region = "{ [0,0,10,10], [20,20,5,5] }".parse().unwrap();
    assert_eq!(parsed.rects().len(), 2);
    assert_eq!(parsed.extents(), rect(0.0, 0.0, 25.0, 25.0));

    // exponential notation, missing separators, trailing whitespace
    let parsed: Region = "{[1e1,0,2.5e1,1][0,0,1,1]}  \n".parse().unwrap();
    assert_eq!(parsed.rects()[0], rect(10.0, 0.0, 25.0, 1.0));

    assert!("nope".parse::<Region>().is_err());
    assert!("{ [1,2,3] }".parse::<Region>().is_err());
    assert!("{} trailing".parse::<Region>().is_err());
}
