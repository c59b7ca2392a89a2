//! Projector integration tests
//!
//! Attribute generation against a live scatter plot, plus the selection and
//! hover flows that go through pointer input.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::fixtures::{projector, three_point_projection};
use proptest::prelude::*;
use scatterplot_core::{
    ColorRgb, Dataset, Dimensions, Key, KeyEvent, Modifiers, MouseButton, MouseEvent, PointStyle, Projection,
    ScatterError,
};

fn style() -> PointStyle {
    PointStyle::default()
}

fn rgb(colors: &[f32], index: usize) -> [f32; 3] {
    [colors[3 * index], colors[3 * index + 1], colors[3 * index + 2]]
}

// === Attribute arrays ===

#[test]
fn test_three_points_one_selected() {
    let (mut p, _) = projector(800, 600);
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();
    p.set_selected_point_indices(vec![2]).unwrap();

    let colors = p.scatter_plot().point_colors();
    assert_eq!(rgb(colors, 0), style().unselected.to_array());
    assert_eq!(rgb(colors, 1), style().unselected.to_array());
    assert_eq!(rgb(colors, 2), style().selected.to_array());
    assert_eq!(p.scatter_plot().point_scale_factors(), &[1.0, 1.0, 1.2]);
    assert_eq!(p.scatter_plot().dimensions(), Dimensions::Two);
}

#[test]
fn test_positions_pushed_to_plot() {
    let (mut p, surface) = projector(800, 600);
    let draws = surface.borrow().draw_count;
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();

    assert_eq!(
        p.scatter_plot().point_positions(),
        &[-1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0]
    );
    assert!(surface.borrow().draw_count > draws);
}

#[test]
fn test_not_renderable_skips_attributes() {
    let (mut p, _) = projector(800, 600);
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), false)
        .unwrap();
    assert!(p.scatter_plot().point_positions().is_empty());
    assert_eq!(p.scatter_plot().dimensions(), Dimensions::Two);
}

#[test]
fn test_hover_wins_over_selection() {
    let (mut p, _) = projector(800, 600);
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();
    p.set_selected_point_indices(vec![1]).unwrap();
    p.set_hover_point_index(Some(1)).unwrap();

    let colors = p.scatter_plot().point_colors();
    assert_eq!(rgb(colors, 1), style().hover.to_array());
    assert_eq!(p.scatter_plot().point_scale_factors()[1], style().scale_hover);
}

#[test]
fn test_legend_colorer_applies_without_selection() {
    let (mut p, _) = projector(800, 600);
    p.set_legend_point_colorer(Some(Box::new(|i: usize| {
        if i == 0 {
            ColorRgb::new(1.0, 0.0, 0.0)
        } else {
            ColorRgb::new(0.0, 0.0, 1.0)
        }
    })));
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();

    let colors = p.scatter_plot().point_colors();
    assert_eq!(rgb(colors, 0), [1.0, 0.0, 0.0]);
    assert_eq!(rgb(colors, 2), [0.0, 0.0, 1.0]);

    // Any selection greys out the legend
    p.set_selected_point_indices(vec![2]).unwrap();
    let colors = p.scatter_plot().point_colors();
    assert_eq!(rgb(colors, 0), style().unselected.to_array());
}

#[test]
fn test_empty_projection() {
    let (mut p, _) = projector(800, 600);
    let empty = Rc::new(Projection::new(Vec::new(), Dimensions::Three));
    p.update_scatter_plot_with_new_projection(Some(empty), true).unwrap();

    assert!(p.generate_point_position_array().is_empty());
    assert!(p.generate_point_color_array(None, &[], None, false, false).is_empty());
    assert!(p.generate_point_scale_factor_array(&[], None).is_empty());
    assert!(p.set_hover_point_index(Some(0)).is_err());
}

#[test]
fn test_clearing_projection() {
    let (mut p, _) = projector(800, 600);
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();
    p.update_scatter_plot_with_new_projection(None, true).unwrap();

    assert!(p.projection().is_none());
    assert!(p.scatter_plot().point_positions().is_empty());
}

#[test]
fn test_out_of_range_selection_rejected() {
    let (mut p, _) = projector(800, 600);
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();
    let err = p.set_selected_point_indices(vec![0, 7]).unwrap_err();
    assert!(matches!(err, ScatterError::PointIndexOutOfRange { index: 7, count: 3 }));
    assert!(p.selected_point_indices().is_empty());
}

#[test]
fn test_3d_label_mode_rerenders() {
    let (mut p, surface) = projector(800, 600);
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();
    let draws = surface.borrow().draw_count;

    p.set_3d_label_mode(true);

    assert!(surface.borrow().draw_count > draws);
    let colors = p.scatter_plot().point_colors();
    assert_eq!(rgb(colors, 0), style().labels_3d_no_selection.to_array());
}

// === Callbacks ===

#[test]
fn test_hover_callback_fires_on_change_only() {
    let (mut p, _) = projector(800, 600);
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    p.on_hover(move |i| log.borrow_mut().push(i));

    p.set_hover_point_index(Some(1)).unwrap();
    p.set_hover_point_index(Some(1)).unwrap();
    p.handle_mouse(&MouseEvent::Leave);

    assert_eq!(*seen.borrow(), vec![Some(1), None]);
    assert_eq!(p.hover_point_index(), None);
}

#[test]
fn test_box_selection_reports_indices() {
    let (mut p, _) = projector(800, 600);
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    p.on_select(move |indices, region| log.borrow_mut().push((indices.to_vec(), region.is_some())));

    // The middle point projects to the viewport center
    p.handle_key(&KeyEvent::pressed(Key::Shift, Modifiers::new().with_shift()));
    p.handle_mouse(&MouseEvent::press(MouseButton::Left, 380.0, 280.0));
    p.handle_mouse(&MouseEvent::moved(400.0, 300.0));
    p.handle_mouse(&MouseEvent::release(MouseButton::Left, 420.0, 320.0));

    assert_eq!(*seen.borrow(), vec![(vec![1], true)]);
    assert_eq!(p.selected_point_indices(), &[1]);
    assert_eq!(rgb(p.scatter_plot().point_colors(), 1), style().selected.to_array());
}

#[test]
fn test_click_clears_selection() {
    let (mut p, _) = projector(800, 600);
    p.update_scatter_plot_with_new_projection(Some(three_point_projection()), true)
        .unwrap();
    p.set_selected_point_indices(vec![0, 2]).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    p.on_select(move |indices, region| log.borrow_mut().push((indices.len(), region.is_some())));

    p.handle_mouse(&MouseEvent::press(MouseButton::Left, 10.0, 10.0));
    p.handle_mouse(&MouseEvent::release(MouseButton::Left, 10.0, 10.0));

    assert!(p.selected_point_indices().is_empty());
    assert_eq!(*seen.borrow(), vec![(0, false)]);
    assert_eq!(rgb(p.scatter_plot().point_colors(), 0), style().no_selection.to_array());
}

// === Property tests ===

fn points_strategy() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (2usize..=3).prop_flat_map(|dims| prop::collection::vec(prop::collection::vec(-1e3f64..1e3, dims), 0..40))
}

proptest! {
    #[test]
    fn prop_array_lengths_track_point_count(points in points_strategy(), pick in 0usize..40) {
        let (mut p, _) = projector(320, 240);
        let n = points.len();
        let dataset = Dataset::new(points, vec![]).unwrap();
        p.update_scatter_plot_with_new_projection(Some(Rc::new(Projection::from_dataset(&dataset))), true)
            .unwrap();

        let selected: Vec<usize> = if n > 0 { vec![pick % n] } else { vec![] };
        let hover = selected.first().copied();

        prop_assert_eq!(p.generate_point_position_array().len(), 3 * n);
        prop_assert_eq!(p.generate_point_color_array(None, &selected, hover, false, false).len(), 3 * n);
        prop_assert_eq!(p.generate_point_scale_factor_array(&selected, hover).len(), n);
    }

    #[test]
    fn prop_positions_stay_in_cube(points in points_strategy()) {
        let (mut p, _) = projector(320, 240);
        let dataset = Dataset::new(points, vec![]).unwrap();
        p.set_projection(Some(Rc::new(Projection::from_dataset(&dataset))));

        for v in p.generate_point_position_array() {
            prop_assert!((-1.0..=1.0).contains(&v));
        }
    }
}
