//! Integration tests for change notification

use std::cell::RefCell;
use std::rc::Rc;

use void_frame::prelude::*;
use void_math::{Quat, Vec3};

type Log = Rc<RefCell<Vec<&'static str>>>;

fn recorder(log: &Log, name: &'static str) -> impl FnMut(FrameRef<'_>) + 'static {
    let log = log.clone();
    move |_frame: FrameRef<'_>| log.borrow_mut().push(name)
}

#[test]
fn test_one_notification_per_mutation() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut graph = FrameGraph::new();
    let id = graph.insert(Frame::identity()).unwrap();
    let log: Log = Rc::default();

    let mut frame = graph.frame_mut(id).unwrap();
    frame.observe(recorder(&log, "a"));

    frame.set_translation(Vec3::X);
    frame.set_rotation(Quat::from_rotation_z(0.1));
    frame.set_translation_and_rotation(Vec3::Y, Quat::IDENTITY);
    frame.translate(Vec3::Z);
    frame.rotate(Quat::from_rotation_x(0.2));
    frame.rotate_around_point(Quat::from_rotation_y(0.3), Vec3::ZERO);
    frame.set_position_and_orientation(Vec3::ZERO, Quat::IDENTITY);

    assert_eq!(log.borrow().len(), 7);
}

#[test]
fn test_registration_order() {
    let mut graph = FrameGraph::new();
    let id = graph.insert(Frame::identity()).unwrap();
    let log: Log = Rc::default();

    let mut frame = graph.frame_mut(id).unwrap();
    frame.observe(recorder(&log, "first"));
    frame.observe(recorder(&log, "second"));
    frame.observe(recorder(&log, "third"));
    frame.translate(Vec3::X);

    assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
}

#[test]
fn test_observer_sees_new_state() {
    let mut graph = FrameGraph::new();
    let parent = graph.insert(Frame::from_translation(Vec3::new(0.0, 1.0, 0.0))).unwrap();
    let id = graph.insert(Frame::identity().with_reference(parent)).unwrap();
    let seen = Rc::new(RefCell::new(Vec3::ZERO));

    let sink = seen.clone();
    graph
        .frame_mut(id)
        .unwrap()
        .observe(move |frame: FrameRef<'_>| *sink.borrow_mut() = frame.position());
    graph.frame_mut(id).unwrap().set_translation(Vec3::X);

    assert_eq!(*seen.borrow(), Vec3::new(1.0, 1.0, 0.0));
}

#[test]
fn test_reference_and_constraint_changes() {
    let mut graph = FrameGraph::new();
    let parent = graph.insert(Frame::identity()).unwrap();
    let id = graph.insert(Frame::identity()).unwrap();
    let log: Log = Rc::default();
    graph.frame_mut(id).unwrap().observe(recorder(&log, "changed"));

    let mut frame = graph.frame_mut(id).unwrap();
    frame.set_reference_frame(Some(parent)).unwrap();
    frame.set_reference_frame(Some(parent)).unwrap();
    frame.set_constraint(Some(Rc::new(AxisPlaneConstraint::locked())));
    assert_eq!(log.borrow().len(), 1);

    // Rejected change leaves observers silent
    let _ = graph.frame_mut(parent).unwrap().set_reference_frame(Some(id));
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_remove_observer() {
    let mut graph = FrameGraph::new();
    let id = graph.insert(Frame::identity()).unwrap();
    let log: Log = Rc::default();

    let mut frame = graph.frame_mut(id).unwrap();
    let kept = frame.observe(recorder(&log, "kept"));
    let dropped = frame.observe(recorder(&log, "dropped"));
    assert_ne!(kept, dropped);

    frame.remove_observer(dropped).unwrap();
    assert_eq!(
        frame.remove_observer(dropped).unwrap_err(),
        FrameError::UnknownObserver(dropped)
    );
    frame.translate(Vec3::X);

    assert_eq!(*log.borrow(), vec!["kept"]);
    assert_eq!(graph.observer_count(id), 1);
}

#[derive(Default)]
struct Counter {
    hits: Rc<RefCell<u32>>,
}

impl FrameObserver for Counter {
    fn on_frame_modified(&mut self, _frame: FrameRef<'_>) {
        *self.hits.borrow_mut() += 1;
    }
}

#[test]
fn test_struct_observer_and_frame_removal() {
    let mut graph = FrameGraph::new();
    let id = graph.insert(Frame::identity()).unwrap();
    let counter = Counter::default();
    let hits = counter.hits.clone();

    graph.frame_mut(id).unwrap().add_observer(counter);
    graph.frame_mut(id).unwrap().rotate(Quat::from_rotation_y(0.5));
    assert_eq!(*hits.borrow(), 1);

    graph.remove(id).unwrap();
    assert_eq!(graph.observer_count(id), 0);
    // Observer was dropped with the frame
    assert_eq!(Rc::strong_count(&hits), 1);
}
