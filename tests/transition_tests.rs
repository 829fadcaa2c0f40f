//! Chapter transitions, camera ownership and rotation

mod common;

#[cfg(test)]
mod tests {
    use super::common::{ms, story, RecordingEngine};
    use scrolly_sync::interp::Easing;
    use scrolly_sync::layers::{DatasetStatus, VisibilityTable};
    use scrolly_sync::protocol::ScrollEvent;
    use scrolly_sync::{
        data, AnimationId, CameraOwnership, LayerId, LngLat, MapEngine, MotionKind,
        RotationTask, SimulatedMap, StoryConfig, StoryCoordinator, SyncConfig, UnlockPolicy,
        Viewport,
    };
    use std::time::Duration;

    type Recording = StoryCoordinator<RecordingEngine, VisibilityTable>;
    type Simulated = StoryCoordinator<SimulatedMap, VisibilityTable>;

    const EPS: f64 = 1e-9;

    fn recording(config: SyncConfig, viewport: Viewport) -> Recording {
        StoryCoordinator::new(
            story(),
            config,
            RecordingEngine::at_origin(),
            VisibilityTable::default(),
            viewport,
        )
    }

    fn simulated(config: SyncConfig) -> Simulated {
        let story = story();
        let viewport = Viewport::default();
        let camera = story.initial_camera(false).unwrap();
        StoryCoordinator::new(
            story,
            config,
            SimulatedMap::new(camera, viewport),
            VisibilityTable::default(),
            viewport,
        )
    }

    fn timer_config(millis: u64) -> SyncConfig {
        SyncConfig {
            unlock: UnlockPolicy::Timer {
                duration: ms(millis),
            },
            ..Default::default()
        }
    }

    /// Advance the simulated engine to `now` and feed its events back.
    fn pump(c: &mut Simulated, now: Duration) {
        c.engine_mut().advance(now);
        for event in c.engine_mut().drain_events() {
            c.handle_engine_event(&event);
        }
        c.tick(now);
    }

    fn enter(c: &mut Recording, segment: &str, now: u64) {
        c.handle_scroll(
            &ScrollEvent::Enter {
                segment: segment.into(),
            },
            ms(now),
        );
    }

    fn last_id(c: &Recording) -> AnimationId {
        c.engine().last_animated().2
    }

    fn chapter(id: &str, extra: &str) -> String {
        format!(
            r#"{{ "id": "{}", "location": {{ "center": [-74.0, 40.7], "zoom": 12,
               "zoomSmall": 11, "pitch": 20, "bearing": 10 }} {} }}"#,
            id, extra
        )
    }

    // -----------------------------------------------------------------------
    // Route entry
    // -----------------------------------------------------------------------

    #[test]
    fn route_entry_flies_to_route_start() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "brooklynView", 0);

        let (target, motion, _) = c.engine().last_animated().clone();
        assert_eq!(motion.kind, MotionKind::Fly);
        assert_eq!(motion.duration, Some(ms(1000)));
        assert_eq!(target.position, LngLat::new(-74.009, 40.73929));
        assert_eq!(target.zoom, 16.0);
        assert_eq!(target.pitch, 60.0);
        assert_eq!(target.bearing, 80.0);

        assert!(c.state().transition_in_flight());
        assert_eq!(c.state().active_segment.as_deref(), Some("brooklynView"));
        assert_eq!(c.stats().transitions_started, 1);
    }

    #[test]
    fn route_entry_on_small_viewport_reduces_zoom() {
        let mut c = recording(SyncConfig::default(), Viewport::new(500.0, 800.0));
        enter(&mut c, "brooklynView", 0);

        let (target, _, _) = c.engine().last_animated();
        assert_eq!(target.zoom, 15.0);
    }

    #[test]
    fn non_route_entry_uses_chapter_location() {
        let mut c = recording(SyncConfig::default(), Viewport::new(400.0, 700.0));
        enter(&mut c, "overview", 0);

        let (target, motion, _) = c.engine().last_animated();
        assert_eq!(motion.kind, MotionKind::Fly);
        assert_eq!(motion.duration, None);
        assert_eq!(target.position, LngLat::new(-74.04, 40.75));
        assert_eq!(target.zoom, 10.0, "zoomSmall on small viewports");
        assert!(c.state().transition_in_flight());
    }

    #[test]
    fn unknown_segment_enter_is_ignored() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "nope", 0);

        assert!(c.engine().animated.is_empty());
        assert!(c.state().active_segment.is_none());
    }

    // -----------------------------------------------------------------------
    // Lock against the simulated engine
    // -----------------------------------------------------------------------

    #[test]
    fn progress_is_dropped_until_entry_fly_settles() {
        let mut c = simulated(SyncConfig::default());
        pump(&mut c, ms(0));
        c.handle_scroll(
            &ScrollEvent::Enter {
                segment: "brooklynView".into(),
            },
            ms(0),
        );

        pump(&mut c, ms(500));
        assert!(c.state().transition_in_flight());
        assert!(c.on_segment_progress("brooklynView", 0.3).is_none());
        assert!(c.engine().immediate_log().is_empty());

        pump(&mut c, ms(1000));
        assert!(!c.state().transition_in_flight());
        assert!(!c.engine().is_animating());

        let camera = c.on_segment_progress("brooklynView", 0.5).unwrap();
        assert!((camera.zoom - 17.0).abs() < EPS);
        assert!((camera.pitch - 70.0).abs() < EPS);
        assert!((camera.bearing - 100.0).abs() < EPS);
        assert_eq!(c.engine().camera(), camera);

        let stats = c.stats();
        assert_eq!(stats.progress_dropped_in_flight, 1);
        assert_eq!(stats.progress_applied, 1);
        assert_eq!(stats.transitions_released, 1);
    }

    #[test]
    fn timer_policy_releases_exactly_at_deadline() {
        let mut c = recording(timer_config(1000), Viewport::default());
        enter(&mut c, "brooklynView", 0);

        c.tick(ms(999));
        assert!(c.state().transition_in_flight());

        // The timer policy ignores the engine.
        let id = last_id(&c);
        c.handle_animation_settled(id);
        assert!(c.state().transition_in_flight());

        c.tick(ms(1000));
        assert!(!c.state().transition_in_flight());
        assert_eq!(c.stats().transitions_released, 1);
    }

    #[test]
    fn settle_policy_ignores_foreign_ids_and_falls_back_to_timeout() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "walliamsburg", 0);

        c.handle_animation_settled(AnimationId(999));
        assert!(c.state().transition_in_flight());

        c.tick(ms(2999));
        assert!(c.state().transition_in_flight());

        c.tick(ms(3000));
        assert!(!c.state().transition_in_flight());
        assert_eq!(c.stats().transitions_released, 1);
    }

    #[test]
    fn stale_settle_does_not_release_superseding_transition() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "brooklynView", 0);
        let first = last_id(&c);
        enter(&mut c, "walliamsburg", 500);
        let second = last_id(&c);

        c.handle_animation_settled(first);
        assert!(c.state().transition_in_flight());
        assert!(c.on_segment_progress("walliamsburg", 0.2).is_none());

        c.handle_animation_settled(second);
        assert!(!c.state().transition_in_flight());
        assert!(c.on_segment_progress("walliamsburg", 0.2).is_some());
    }

    #[test]
    fn stale_timer_does_not_release_superseding_transition() {
        let mut c = recording(timer_config(1000), Viewport::default());
        enter(&mut c, "brooklynView", 0);
        enter(&mut c, "walliamsburg", 800);

        c.tick(ms(1000));
        match &c.state().ownership {
            CameraOwnership::TransitionInFlight {
                segment, deadline, ..
            } => {
                assert_eq!(segment, "walliamsburg");
                assert_eq!(*deadline, ms(1800));
            }
            other => panic!("expected a transition in flight, got {:?}", other),
        }

        c.tick(ms(1800));
        assert!(!c.state().transition_in_flight());
    }

    #[test]
    fn simulated_interruption_does_not_release_new_transition() {
        let mut c = simulated(SyncConfig::default());
        pump(&mut c, ms(0));
        c.handle_scroll(
            &ScrollEvent::Enter {
                segment: "brooklynView".into(),
            },
            ms(0),
        );
        pump(&mut c, ms(300));
        c.handle_scroll(
            &ScrollEvent::Enter {
                segment: "walliamsburg".into(),
            },
            ms(300),
        );

        // The interrupted fly reports its settle on the next drain.
        pump(&mut c, ms(316));
        assert!(c.state().transition_in_flight());

        pump(&mut c, ms(1300));
        assert!(!c.state().transition_in_flight());
    }

    // -----------------------------------------------------------------------
    // Rotation
    // -----------------------------------------------------------------------

    #[test]
    fn rotation_starts_after_entry_settles() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "networkView", 0);
        let fly = last_id(&c);
        assert_eq!(
            c.state().rotation,
            RotationTask::AwaitingSettle { after: fly }
        );

        c.handle_animation_settled(fly);
        let (target, motion, id) = c.engine().last_animated().clone();
        assert_eq!(motion.kind, MotionKind::Ease);
        assert_eq!(motion.duration, Some(ms(24_000)));
        assert_eq!(motion.easing, Easing::Linear);
        assert_eq!(target.bearing, 90.0);
        assert_eq!(c.state().rotation, RotationTask::Running { animation: id });
        assert_eq!(c.stats().rotations_started, 1);
    }

    #[test]
    fn new_enter_cancels_running_rotation() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "networkView", 0);
        let fly = last_id(&c);
        c.handle_animation_settled(fly);
        let stops = c.engine().stops;

        enter(&mut c, "overview", 2000);
        assert_eq!(c.engine().stops, stops + 1);
        assert_eq!(c.state().rotation, RotationTask::Idle);
        assert_eq!(c.stats().rotations_cancelled, 1);
    }

    #[test]
    fn enter_before_settle_drops_pending_rotation() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "networkView", 0);
        let fly = last_id(&c);
        enter(&mut c, "overview", 500);

        c.handle_animation_settled(fly);
        assert_eq!(c.state().rotation, RotationTask::Idle);
        assert_eq!(c.stats().rotations_started, 0);
    }

    #[test]
    fn route_segments_never_rotate() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "brooklynView", 0);
        let fly = last_id(&c);
        c.handle_animation_settled(fly);

        assert_eq!(c.state().rotation, RotationTask::Idle);
        assert_eq!(c.stats().rotations_started, 0);
        assert_eq!(c.engine().animated.len(), 1);
    }

    #[test]
    fn jump_chapter_rotates_immediately_without_lock() {
        let raw = format!(
            r#"{{ "chapters": [ {} ] }}"#,
            chapter("spin", r#", "mapAnimation": "jumpTo", "rotateAnimation": true"#)
        );
        let story = StoryConfig::from_json_str(&raw).unwrap();
        let mut c = StoryCoordinator::new(
            story,
            SyncConfig::default(),
            RecordingEngine::at_origin(),
            VisibilityTable::default(),
            Viewport::default(),
        );
        c.on_segment_enter("spin");

        assert_eq!(c.engine().immediate.len(), 1);
        assert_eq!(c.engine().immediate[0].bearing, 10.0);
        assert_eq!(c.state().ownership, CameraOwnership::Idle);
        let (target, _, id) = c.engine().last_animated().clone();
        assert_eq!(target.bearing, 100.0);
        assert_eq!(c.state().rotation, RotationTask::Running { animation: id });
        assert_eq!(c.stats().transitions_started, 0);
        assert_eq!(c.stats().rotations_started, 1);
    }

    #[test]
    fn jump_over_in_flight_transition_counts_as_release() {
        let raw = format!(
            r#"{{ "chapters": [ {}, {} ], "routes": {{ "ride": {{
                "startPosition": [-74.0, 40.7], "endPosition": [-73.9, 40.8],
                "startZoom": 14, "endZoom": 16, "startPitch": 30, "endPitch": 60,
                "startBearing": 0, "endBearing": 40 }} }} }}"#,
            chapter("ride", ""),
            chapter("spin", r#", "mapAnimation": "jumpTo""#)
        );
        let mut c = StoryCoordinator::new(
            StoryConfig::from_json_str(&raw).unwrap(),
            SyncConfig::default(),
            RecordingEngine::at_origin(),
            VisibilityTable::default(),
            Viewport::default(),
        );

        enter(&mut c, "ride", 0);
        assert!(c.state().transition_in_flight());
        enter(&mut c, "spin", 200);

        assert_eq!(c.state().ownership, CameraOwnership::Idle);
        assert_eq!(c.stats().transitions_started, 1);
        assert_eq!(c.stats().transitions_released, 1);

        // Nothing left to release later.
        c.tick(ms(5000));
        assert_eq!(c.stats().transitions_released, 1);
    }

    #[test]
    fn jump_from_idle_releases_nothing() {
        let raw = format!(
            r#"{{ "chapters": [ {} ] }}"#,
            chapter("spin", r#", "mapAnimation": "jumpTo""#)
        );
        let mut c = StoryCoordinator::new(
            StoryConfig::from_json_str(&raw).unwrap(),
            SyncConfig::default(),
            RecordingEngine::at_origin(),
            VisibilityTable::default(),
            Viewport::default(),
        );
        enter(&mut c, "spin", 0);
        assert_eq!(c.stats().transitions_released, 0);
    }

    // -----------------------------------------------------------------------
    // Overlay effects & progress routing
    // -----------------------------------------------------------------------

    #[test]
    fn enter_and_exit_effects_apply_in_arrival_order() {
        let mut c = recording(SyncConfig::default(), Viewport::default());

        let frame = c.on_segment_enter("connections").unwrap();
        assert_eq!(frame.opacity, 1.0);
        assert_eq!(frame.placements.len(), 3);

        // Scrolling down: the next chapter can enter before this one exits.
        assert!(c.on_segment_enter("brooklynView").is_none());
        assert_eq!(c.overlay().opacity(), 1.0);
        assert_eq!(c.on_segment_exit("connections").unwrap().opacity, 0.0);

        // Scrolling back up.
        assert!(c.on_segment_exit("brooklynView").is_none());
        assert_eq!(c.on_segment_enter("connections").unwrap().opacity, 1.0);
    }

    #[test]
    fn exit_leaves_camera_ownership_alone() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "brooklynView", 0);
        c.on_segment_exit("brooklynView");

        assert!(c.state().transition_in_flight());
        assert_eq!(c.state().active_segment.as_deref(), Some("brooklynView"));
    }

    #[test]
    fn progress_for_inactive_segment_is_ignored() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "brooklynView", 0);
        c.handle_animation_settled(last_id(&c));

        c.handle_scroll(
            &ScrollEvent::Progress {
                segment: "walliamsburg".into(),
                progress: 0.4,
            },
            ms(1500),
        );
        assert!(c.engine().immediate.is_empty());
        assert_eq!(c.stats().progress_ignored, 1);
        assert_eq!(c.stats().progress_applied, 0);
    }

    // -----------------------------------------------------------------------
    // Layer actions
    // -----------------------------------------------------------------------

    #[test]
    fn layer_actions_wait_for_datasets() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        enter(&mut c, "overview", 0);
        assert!(c.layers().sink().visible.is_empty());

        c.on_dataset_loaded(LayerId::Scatterplot, Ok(120));
        c.on_dataset_loaded(LayerId::Arcs, Ok(40));

        let sink = c.layers().sink();
        assert!(sink.is_visible(LayerId::Scatterplot));
        assert!(sink.is_visible(LayerId::Arcs));
        assert_eq!(
            c.layers().status(LayerId::Arcs),
            DatasetStatus::Ready { records: 40 }
        );
    }

    #[test]
    fn failed_dataset_leaves_its_layer_untouched() {
        let mut c = recording(SyncConfig::default(), Viewport::default());
        c.on_dataset_loaded(LayerId::Scatterplot, Ok(3));
        c.on_dataset_loaded(
            LayerId::Arcs,
            data::load_trajectory_arcs("/nonexistent/trajectory_arcs.json").map(|a| a.len()),
        );
        assert_eq!(c.layers().status(LayerId::Arcs), DatasetStatus::Failed);

        enter(&mut c, "manhattanDetail", 0);
        let sink = c.layers().sink();
        assert!(sink.is_visible(LayerId::Scatterplot));
        assert!(!sink.visible.contains_key(&LayerId::Arcs));
    }

    #[test]
    fn scatter_only_action_hides_arcs() {
        let raw = format!(
            r#"{{ "chapters": [ {}, {} ] }}"#,
            chapter("a", r#", "callback": "showBothLayers""#),
            chapter("b", r#", "callback": "showScatterOnly""#)
        );
        let mut c = StoryCoordinator::new(
            StoryConfig::from_json_str(&raw).unwrap(),
            SyncConfig::default(),
            RecordingEngine::at_origin(),
            VisibilityTable::default(),
            Viewport::default(),
        );
        c.on_dataset_loaded(LayerId::Scatterplot, Ok(1));
        c.on_dataset_loaded(LayerId::Arcs, Ok(1));
        assert!(c.layers().sink().is_visible(LayerId::Arcs));

        c.on_segment_enter("b");
        assert!(c.layers().sink().is_visible(LayerId::Scatterplot));
        assert!(!c.layers().sink().is_visible(LayerId::Arcs));
    }
}
