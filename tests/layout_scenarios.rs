use reflow_core::{ComponentConstraint, Dimension, LayoutBox, LayoutKind, SizeReport};
use reflow_layout::{engine_for, LayoutChild, LayoutEngine};

fn child(kind: LayoutKind, id: &str, constraint: &str, width: i32, height: i32) -> LayoutChild {
    LayoutChild::new(
        id,
        ComponentConstraint::parse_or_default(kind, Some(constraint)),
        SizeReport::preferred(Dimension::new(width, height)),
    )
}

fn indexed(children: Vec<LayoutChild>) -> Vec<LayoutChild> {
    children
        .into_iter()
        .enumerate()
        .map(|(i, c)| c.with_index(i))
        .collect()
}

fn engine(source: &str) -> Box<dyn LayoutEngine> {
    let (descriptor, engine) = engine_for(source);
    assert!(descriptor.is_some(), "descriptor {:?} should parse", source);
    engine
}

#[test]
fn form_single_child_with_margins() {
    let mut layout = engine("FormLayout,5,5,5,5,0,0,0,0");
    let children = vec![child(LayoutKind::Form, "field", "t0;l0;b0;r0", 100, 30)];

    let result = layout.compute_layout(&children, Some(Dimension::new(110, 40)));
    assert_eq!(result.preferred_size, Dimension::new(110, 40));
    assert_eq!(result.size_map["field"], LayoutBox::new(5, 5, 100, 30));
}

#[test]
fn flow_centered_row() {
    let mut layout = engine("FlowLayout,0,0,0,0,10,0,0,1,0,0");
    let children = indexed(vec![
        child(LayoutKind::Flow, "a", "", 50, 20),
        child(LayoutKind::Flow, "b", "", 70, 20),
        child(LayoutKind::Flow, "c", "", 30, 20),
    ]);

    let map = layout.arrange(&children, Dimension::new(300, 40));
    assert_eq!(map["a"].left, 65);
    assert_eq!(map["b"].left, 125);
    assert_eq!(map["c"].left, 205);
}

#[test]
fn grid_spanning_child() {
    let mut layout = engine("GridLayout,0,0,0,0,0,0,2,2");
    let children = vec![child(LayoutKind::Grid, "wide", "0;0;2;1", 10, 10)];
    let map = layout.arrange(&children, Dimension::new(200, 200));
    assert_eq!(map["wide"], LayoutBox::new(0, 0, 200, 100));
}

#[test]
fn empty_containers_measure_their_margins() {
    for source in [
        "FormLayout,3,4,5,6,0,0,0,0",
        "FlowLayout,3,4,5,6,8,8,0,0,0,0",
        "BorderLayout,3,4,5,6,8,8",
        "GridLayout,3,4,5,6,0,0,1,1",
        "NullLayout,3,4,5,6",
    ] {
        let mut layout = engine(source);
        assert_eq!(layout.measure(&[]).preferred, Dimension::new(10, 8), "{}", source);
    }
}

#[test]
fn flow_without_stretch_never_overlaps() {
    let sizes = [(13, 7), (1, 40), (29, 3), (8, 8), (55, 12), (2, 2)];
    for (gap, alignment) in [(0, 0), (3, 1), (11, 2)] {
        let source = format!("FlowLayout,1,2,3,4,{},0,0,{},0,0", gap, alignment);
        let mut layout = engine(&source);
        let children = indexed(
            sizes
                .iter()
                .enumerate()
                .map(|(i, (w, h))| child(LayoutKind::Flow, &format!("c{}", i), "", *w, *h))
                .collect(),
        );

        let map = layout.arrange(&children, Dimension::new(400, 60));
        let boxes: Vec<LayoutBox> = (0..sizes.len()).map(|i| map[&format!("c{}", i)]).collect();
        for pair in boxes.windows(2) {
            assert_eq!(pair[1].left - pair[0].right(), gap, "{}", source);
        }
    }
}

#[test]
fn border_center_height_matches_its_neighbors() {
    let gap = 7;
    for north in [None, Some(12)] {
        for south in [None, Some(30)] {
            let mut children = vec![child(LayoutKind::Border, "center", "Center", 10, 10)];
            if let Some(height) = north {
                children.push(child(LayoutKind::Border, "north", "North", 10, height));
            }
            if let Some(height) = south {
                children.push(child(LayoutKind::Border, "south", "South", 10, height));
            }
            let children = indexed(children);

            let mut layout = engine("BorderLayout,2,2,2,2,7,7");
            let map = layout.arrange(&children, Dimension::new(150, 150));

            let expected = 146 - north.map_or(0, |h| h + gap) - south.map_or(0, |h| h + gap);
            assert_eq!(map["center"].height, expected);
        }
    }
}

#[test]
fn grid_rounding_loss_is_bounded_by_column_count() {
    for columns in 1..6 {
        for width in [97, 100, 101, 113, 255] {
            let source = format!("GridLayout,0,0,0,0,0,0,{},1", columns);
            let mut layout = engine(&source);
            let children = indexed(
                (0..columns)
                    .map(|c| child(LayoutKind::Grid, &format!("c{}", c), &format!("{};0;1;1", c), 1, 1))
                    .collect(),
            );
            let map = layout.arrange(&children, Dimension::new(width, 20));
            let covered: i32 = map.values().map(|b| b.width).sum();
            assert!(width - covered >= 0 && width - covered < columns);
        }
    }
}

#[test]
fn every_engine_is_idempotent() {
    let cases: Vec<(&str, LayoutKind, Vec<(&str, &str)>)> = vec![
        (
            "FormLayout,4,4,4,4,6,6,1,0",
            LayoutKind::Form,
            vec![("a", "t0;l0;b0;r0"), ("b", "t0;l1;b0;r1"), ("c", "t1;l0;b1;r1")],
        ),
        ("FlowLayout,1,1,1,1,2,2,0,3,3,0", LayoutKind::Flow, vec![("a", ""), ("b", "")]),
        (
            "BorderLayout,1,1,1,1,2,2",
            LayoutKind::Border,
            vec![("a", "North"), ("b", "West"), ("c", "Center")],
        ),
        ("GridLayout,0,0,0,0,1,1,3,3", LayoutKind::Grid, vec![("a", "0;0;2;2"), ("b", "2;2;1;1")]),
        ("NullLayout,2,2,2,2", LayoutKind::Null, vec![("a", "5;5;10;10"), ("b", "bad")]),
    ];

    for (source, kind, specs) in cases {
        let children = indexed(
            specs
                .iter()
                .enumerate()
                .map(|(i, (id, constraint))| child(kind, id, constraint, 20 + i as i32 * 7, 15))
                .collect(),
        );
        let mut layout = engine(source);
        let first = layout.compute_layout(&children, Some(Dimension::new(240, 180)));
        let second = layout.compute_layout(&children, Some(Dimension::new(240, 180)));
        assert_eq!(first, second, "{}", source);
        assert_eq!(first.size_map.len(), specs.len(), "{}", source);
    }
}

#[test]
fn unbounded_sizes_saturate_in_every_engine() {
    let sentinel = Dimension::parse("2147483648,2147483648").unwrap();
    assert_eq!(sentinel, Dimension::UNBOUNDED);

    let cases: Vec<(&str, LayoutKind, [&str; 2])> = vec![
        ("FormLayout,3,3,3,3,6,6,0,0", LayoutKind::Form, ["t0;l0;b0;r0", "t0;l1;b0;r1"]),
        ("FlowLayout,3,3,3,3,6,6,0,1,1,0", LayoutKind::Flow, ["", ""]),
        ("BorderLayout,3,3,3,3,6,6", LayoutKind::Border, ["North", "West"]),
        ("GridLayout,3,3,3,3,6,6,2,1", LayoutKind::Grid, ["0;0;1;1", "1;0;1;1"]),
        ("NullLayout,3,3,3,3", LayoutKind::Null, ["unplaced", "5;5;10;10"]),
    ];

    for (source, kind, [first, second]) in cases {
        let children = indexed(vec![
            LayoutChild::new(
                "huge",
                ComponentConstraint::parse_or_default(kind, Some(first)),
                SizeReport::preferred(sentinel),
            ),
            child(kind, "small", second, 10, 10),
        ]);

        let mut layout = engine(source);
        let result = layout.compute_layout(&children, Some(Dimension::new(300, 200)));
        assert_eq!(result.preferred_size, Dimension::UNBOUNDED, "{}", source);
        assert_eq!(result.size_map.len(), 2, "{}", source);
        assert!(
            result.size_map.values().all(|b| b.width >= 0 && b.height >= 0),
            "{}",
            source
        );
    }
}

#[test]
fn extreme_grid_cells_and_counts_saturate() {
    let mut layout = engine("GridLayout,0,0,0,0,0,0,0,0");
    let children = vec![child(LayoutKind::Grid, "far", "2147483647;0;1;1", 10, 10)];
    let result = layout.compute_layout(&children, Some(Dimension::new(200, 200)));
    assert_eq!(result.preferred_size.width, reflow_core::UNBOUNDED);
    assert_eq!(result.size_map["far"].width, 0);

    let mut layout = engine("GridLayout,0,0,0,0,10,0,2147483647,1");
    let children = vec![child(LayoutKind::Grid, "a", "0;0;1;1", 10, 10)];
    let result = layout.compute_layout(&children, Some(Dimension::new(400, 40)));
    assert_eq!(result.preferred_size, Dimension::new(reflow_core::UNBOUNDED, 10));
    assert_eq!(result.size_map["a"], LayoutBox::new(0, 0, 0, 40));
}
