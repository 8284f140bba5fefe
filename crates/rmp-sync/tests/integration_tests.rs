//! Integration tests for the RMP sync engine
//!
//! These tests verify end-to-end behavior of the bridge including:
//! - Change detection and frame emission per channel
//! - Reset handling and input dispatch
//! - Lamp-test override, brightness scaling and power
//! - Failure policy for telemetry, device and codec errors
//! - Session subscription and teardown

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use rmp_protocol::{Frequency, WireFrame};
use rmp_sync::config::{
    DEFAULT_ACTIVE_FREQUENCY, DEFAULT_BRIGHTNESS, DEFAULT_POWER, DEFAULT_SELF_TEST,
    DEFAULT_STANDBY_FREQUENCY,
};
use rmp_sync::{
    Bridge, ChannelId, Dispatched, PanelDevice, Session, SyncConfig, SyncEngine, Telemetry,
    TransportError,
};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    /// In-memory simulator
    #[derive(Default)]
    pub struct FakeSim {
        pub values: HashMap<String, f64>,
        pub commands: Vec<String>,
        pub subscribed: Vec<String>,
        pub fail_reads: bool,
        pub fail_commands: bool,
        pub fail_subscribe_after: Option<usize>,
        pub shutdown: Rc<RefCell<bool>>,
        pub reads: usize,
    }

    impl FakeSim {
        pub fn set(&mut self, channel: &str, value: f64) {
            self.values.insert(channel.to_string(), value);
        }
    }

    impl Telemetry for FakeSim {
        fn subscribe(&mut self, channel: &str) -> Result<(), TransportError> {
            if self.fail_subscribe_after == Some(self.subscribed.len()) {
                return Err(TransportError::Telemetry("subscription refused".into()));
            }
            self.subscribed.push(channel.to_string());
            Ok(())
        }

        fn read(&mut self, channel: &str) -> Result<Option<f64>, TransportError> {
            self.reads += 1;
            if self.fail_reads {
                return Err(TransportError::Telemetry("socket closed".into()));
            }
            Ok(self.values.get(channel).copied())
        }

        fn send_command(&mut self, command: &str) -> Result<(), TransportError> {
            if self.fail_commands {
                return Err(TransportError::Telemetry("command socket closed".into()));
            }
            self.commands.push(command.to_string());
            Ok(())
        }

        fn shutdown(&mut self) {
            *self.shutdown.borrow_mut() = true;
        }
    }

    /// In-memory panel
    #[derive(Default)]
    pub struct FakePanel {
        pub pending: Vec<u8>,
        pub flushed: Vec<u8>,
        pub flushes: usize,
        pub lines: VecDeque<String>,
        pub fail_writes_after: Option<usize>,
        pub fail_flush: bool,
        pub fail_read_line: bool,
        pub writes: usize,
        pub closed: Rc<RefCell<bool>>,
    }

    impl FakePanel {
        pub fn push_line(&mut self, line: &str) {
            self.lines.push_back(format!("{}\n", line));
        }

        /// Frames flushed since the last call
        pub fn take_frames(&mut self) -> Vec<WireFrame> {
            let bytes = std::mem::take(&mut self.flushed);
            bytes
                .chunks(4)
                .map(|chunk| WireFrame::parse(chunk).unwrap())
                .collect()
        }
    }

    impl PanelDevice for FakePanel {
        fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            if self.fail_writes_after == Some(self.writes) {
                return Err(TransportError::Device("unplugged".into()));
            }
            self.writes += 1;
            self.pending.extend_from_slice(bytes);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), TransportError> {
            self.flushes += 1;
            if self.fail_flush {
                // Queued bytes are lost with the failed transfer
                self.pending.clear();
                return Err(TransportError::Device("transfer timed out".into()));
            }
            self.flushed.append(&mut self.pending);
            Ok(())
        }

        fn read_line(&mut self) -> Result<Option<String>, TransportError> {
            if self.fail_read_line {
                return Err(TransportError::Device("framing error".into()));
            }
            Ok(self.lines.pop_front())
        }

        fn close(&mut self) {
            *self.closed.borrow_mut() = true;
        }
    }

    pub fn freq_bytes(prefix: u16, suffix: u16) -> [u8; 2] {
        Frequency::new(prefix, suffix).encode().unwrap()
    }

    /// Simulator with every default channel reporting
    pub fn full_sim() -> FakeSim {
        let mut sim = FakeSim::default();
        sim.set(DEFAULT_ACTIVE_FREQUENCY, 118_300.0);
        sim.set(DEFAULT_STANDBY_FREQUENCY, 121_500.0);
        sim.set(DEFAULT_SELF_TEST, 1.0);
        sim.set(DEFAULT_BRIGHTNESS, 1.0);
        sim.set(DEFAULT_POWER, 1.0);
        sim
    }
}

use helpers::{freq_bytes, full_sim, FakePanel, FakeSim};

// ============================================================================
// Change Detection Tests
// ============================================================================

mod change_detection_tests {
    use super::*;

    #[test]
    fn active_frequency_scenario() {
        let mut engine = SyncEngine::new(SyncConfig::legacy()).unwrap();
        let mut sim = FakeSim::default();
        let mut panel = FakePanel::default();

        // Tick 1: zero means "not reported yet"
        sim.set(DEFAULT_ACTIVE_FREQUENCY, 0.0);
        let report = engine.tick(&mut sim, &mut panel);
        assert!(!report.changed());
        assert!(report.unavailable.contains(&ChannelId::ActiveFrequency));
        assert!(panel.take_frames().is_empty());

        // Tick 2: first real value
        sim.set(DEFAULT_ACTIVE_FREQUENCY, 118_300.0);
        engine.tick(&mut sim, &mut panel);
        let [b0, b1] = freq_bytes(118, 300);
        assert_eq!(panel.flushed, vec![0xFF, 0x01, b0, b1]);
        panel.take_frames();

        // Tick 3: unchanged
        let report = engine.tick(&mut sim, &mut panel);
        assert!(!report.changed());
        assert!(panel.take_frames().is_empty());

        // Tick 4: retuned
        sim.set(DEFAULT_ACTIVE_FREQUENCY, 119_050.0);
        engine.tick(&mut sim, &mut panel);
        let [b0, b1] = freq_bytes(119, 50);
        assert_eq!(panel.flushed, vec![0xFF, 0x01, b0, b1]);
    }

    #[test]
    fn first_tick_sends_every_channel_in_order() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();

        let report = engine.tick(&mut sim, &mut panel);

        let channels: Vec<ChannelId> = report.sent.iter().map(|(ch, _)| *ch).collect();
        assert_eq!(channels, ChannelId::ALL.to_vec());
        assert_eq!(
            panel.take_frames(),
            vec![
                WireFrame::active_frequency(&Frequency::new(118, 300)).unwrap(),
                WireFrame::standby_frequency(&Frequency::new(121, 500)).unwrap(),
                WireFrame::brightness(3),
                WireFrame::power(true),
            ]
        );
    }

    #[test]
    fn flushes_once_per_tick() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();

        let report = engine.tick(&mut sim, &mut panel);
        assert!(report.flushed);
        assert_eq!(panel.writes, 4);
        assert_eq!(panel.flushes, 1);

        // Nothing changed: no flush at all
        let report = engine.tick(&mut sim, &mut panel);
        assert!(!report.flushed);
        assert_eq!(panel.flushes, 1);
    }

    #[test]
    fn only_changed_channel_is_resent() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        engine.tick(&mut sim, &mut panel);
        panel.take_frames();

        sim.set(DEFAULT_STANDBY_FREQUENCY, 122_800.0);
        let report = engine.tick(&mut sim, &mut panel);

        assert_eq!(report.sent.len(), 1);
        assert_eq!(
            panel.take_frames(),
            vec![WireFrame::standby_frequency(&Frequency::new(122, 800)).unwrap()]
        );
        assert_eq!(report.unchanged.len(), 3);
    }

    #[test]
    fn missing_telemetry_leaves_channel_unavailable() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = FakeSim::default();
        let mut panel = FakePanel::default();

        let report = engine.tick(&mut sim, &mut panel);

        assert!(!report.changed());
        assert!(report.is_success());
        assert_eq!(report.unavailable, ChannelId::ALL.to_vec());
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn legacy_config_never_sends_brightness_or_power() {
        let mut engine = SyncEngine::new(SyncConfig::legacy()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();

        let report = engine.tick(&mut sim, &mut panel);

        assert_eq!(report.sent.len(), 2);
        assert!(report.frame_for(ChannelId::Brightness).is_none());
        assert!(report.frame_for(ChannelId::Power).is_none());
    }
}

// ============================================================================
// Derived Value Tests
// ============================================================================

mod derived_value_tests {
    use super::*;

    #[test]
    fn lamp_test_overrides_both_windows() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        engine.tick(&mut sim, &mut panel);
        panel.take_frames();

        sim.set(DEFAULT_SELF_TEST, 2.0);
        engine.tick(&mut sim, &mut panel);

        assert_eq!(
            panel.take_frames(),
            vec![
                WireFrame::active_frequency(&Frequency::TEST).unwrap(),
                WireFrame::standby_frequency(&Frequency::TEST).unwrap(),
            ]
        );

        // Back to normal restores the real frequencies
        sim.set(DEFAULT_SELF_TEST, 0.0);
        let report = engine.tick(&mut sim, &mut panel);
        assert_eq!(report.sent.len(), 2);
    }

    #[test]
    fn lamp_test_applies_even_without_frequency_data() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = FakeSim::default();
        let mut panel = FakePanel::default();
        sim.set(DEFAULT_SELF_TEST, 2.0);

        let report = engine.tick(&mut sim, &mut panel);

        assert!(report.frame_for(ChannelId::ActiveFrequency).is_some());
        assert!(report.frame_for(ChannelId::StandbyFrequency).is_some());
    }

    #[test]
    fn brightness_is_scaled_and_rounded() {
        let config = SyncConfig::default().with_brightness_scale(7);
        let mut engine = SyncEngine::new(config).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        sim.set(DEFAULT_BRIGHTNESS, 0.5);

        let report = engine.tick(&mut sim, &mut panel);

        // 0.5 * 7 = 3.5 rounds to 4
        assert_eq!(
            report.frame_for(ChannelId::Brightness),
            Some(&WireFrame::brightness(4))
        );
    }

    #[test]
    fn small_brightness_drift_is_not_resent() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        sim.set(DEFAULT_BRIGHTNESS, 0.70);
        engine.tick(&mut sim, &mut panel);

        // 0.70 * 3 = 2.1 and 0.75 * 3 = 2.25 both show level 2
        sim.set(DEFAULT_BRIGHTNESS, 0.75);
        let report = engine.tick(&mut sim, &mut panel);
        assert!(report.frame_for(ChannelId::Brightness).is_none());
    }

    #[test]
    fn power_follows_switch_code() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        sim.set(DEFAULT_POWER, 0.0);

        let report = engine.tick(&mut sim, &mut panel);
        assert_eq!(report.frame_for(ChannelId::Power), Some(&WireFrame::power(false)));

        sim.set(DEFAULT_POWER, 1.0);
        let report = engine.tick(&mut sim, &mut panel);
        assert_eq!(report.frame_for(ChannelId::Power), Some(&WireFrame::power(true)));

        // Any other code is "off"
        sim.set(DEFAULT_POWER, 2.0);
        let report = engine.tick(&mut sim, &mut panel);
        assert_eq!(report.frame_for(ChannelId::Power), Some(&WireFrame::power(false)));
    }
}

// ============================================================================
// Failure Policy Tests
// ============================================================================

mod failure_tests {
    use super::*;

    #[test]
    fn out_of_band_frequency_fails_only_that_channel() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        sim.set(DEFAULT_ACTIVE_FREQUENCY, 108_000.0);

        let report = engine.tick(&mut sim, &mut panel);

        assert_eq!(report.failed_channels(), vec![ChannelId::ActiveFrequency]);
        assert!(report.aborted.is_none());
        assert_eq!(report.sent.len(), 3);
        assert!(engine.cache().get(ChannelId::ActiveFrequency).is_none());
    }

    #[test]
    fn malformed_frequency_fails_only_that_channel() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        sim.set(DEFAULT_STANDBY_FREQUENCY, 12_345.0);

        let report = engine.tick(&mut sim, &mut panel);

        assert_eq!(report.failed_channels(), vec![ChannelId::StandbyFrequency]);
        assert!(report.frame_for(ChannelId::ActiveFrequency).is_some());
    }

    #[test]
    fn telemetry_failure_abandons_tick() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        sim.fail_reads = true;

        let report = engine.tick(&mut sim, &mut panel);

        assert!(report.aborted.as_ref().is_some_and(|e| e.is_transport()));
        assert!(!report.changed());
        assert_eq!(panel.writes, 0);
        assert!(engine.cache().is_empty());

        // Recovery: the next good tick sends everything
        sim.fail_reads = false;
        let report = engine.tick(&mut sim, &mut panel);
        assert_eq!(report.sent.len(), 4);
    }

    #[test]
    fn write_failure_keeps_remaining_channels_stale() {
        let mut engine = SyncEngine::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        panel.fail_writes_after = Some(1);

        let report = engine.tick(&mut sim, &mut panel);

        assert!(report.aborted.is_some());
        assert_eq!(report.sent.len(), 1);
        // The frame written before the failure is still flushed
        assert!(report.flushed);
        assert!(engine.cache().get(ChannelId::ActiveFrequency).is_some());
        assert!(engine.cache().get(ChannelId::StandbyFrequency).is_none());

        panel.fail_writes_after = None;
        let report = engine.tick(&mut sim, &mut panel);
        let channels: Vec<ChannelId> = report.sent.iter().map(|(ch, _)| *ch).collect();
        assert_eq!(
            channels,
            vec![ChannelId::StandbyFrequency, ChannelId::Brightness, ChannelId::Power]
        );
    }

    #[test]
    fn flush_failure_resends_next_tick() {
        let mut engine = SyncEngine::new(SyncConfig::legacy()).unwrap();
        let mut sim = FakeSim::default();
        let mut panel = FakePanel::default();
        sim.set(DEFAULT_ACTIVE_FREQUENCY, 118_300.0);
        panel.fail_flush = true;

        let report = engine.tick(&mut sim, &mut panel);

        assert!(report.aborted.as_ref().is_some_and(|e| e.is_transport()));
        assert!(!report.flushed);
        assert!(engine.cache().get(ChannelId::ActiveFrequency).is_none());
        assert!(panel.take_frames().is_empty());

        panel.fail_flush = false;
        let report = engine.tick(&mut sim, &mut panel);

        assert!(report.is_success());
        assert_eq!(
            panel.take_frames(),
            vec![WireFrame::active_frequency(&Frequency::new(118, 300)).unwrap()]
        );

        // Once delivered, the value is not resent
        let report = engine.tick(&mut sim, &mut panel);
        assert!(!report.changed());
    }
}

// ============================================================================
// Bridge Tests
// ============================================================================

mod bridge_tests {
    use super::*;

    #[test]
    fn reset_resends_unchanged_values() {
        let mut bridge = Bridge::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();

        bridge.step(&mut sim, &mut panel);
        let report = bridge.step(&mut sim, &mut panel);
        assert!(!report.tick.changed());

        panel.push_line("reset");
        let report = bridge.step(&mut sim, &mut panel);

        assert!(report.had_reset());
        assert_eq!(report.tick.sent.len(), 4);
    }

    #[test]
    fn reset_skips_channels_without_data() {
        let mut bridge = Bridge::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        bridge.step(&mut sim, &mut panel);

        sim.values.remove(DEFAULT_POWER);
        panel.push_line("reset");
        let report = bridge.step(&mut sim, &mut panel);

        assert_eq!(report.tick.sent.len(), 3);
        assert!(report.tick.unavailable.contains(&ChannelId::Power));
    }

    #[test]
    fn swap_issues_one_command_and_keeps_cache() {
        let mut bridge = Bridge::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        bridge.step(&mut sim, &mut panel);
        let known = bridge.engine().cache().len();

        panel.push_line("cmd=Swap");
        let report = bridge.step(&mut sim, &mut panel);

        assert_eq!(sim.commands, vec!["AirbusFBW/RMPSwapCapt"]);
        assert!(matches!(report.inputs.as_slice(), [Dispatched::Command { .. }]));
        assert_eq!(bridge.engine().cache().len(), known);
        assert!(!report.tick.changed());
    }

    #[test]
    fn unrecognized_line_is_reported_and_ignored() {
        let mut bridge = Bridge::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();

        panel.push_line("hello");
        panel.push_line("cmd=InnerUp");
        let report = bridge.step(&mut sim, &mut panel);

        assert_eq!(report.rejected, vec!["hello"]);
        assert_eq!(sim.commands, vec!["AirbusFBW/RMP1FreqUpSml"]);
        assert!(!report.is_success());
        // The sync pass still ran
        assert_eq!(report.tick.sent.len(), 4);
    }

    #[test]
    fn input_is_drained_before_sync() {
        let mut bridge = Bridge::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        bridge.step(&mut sim, &mut panel);

        // A reset queued behind a control event is still handled this step
        panel.push_line("cmd=OuterUp");
        panel.push_line("reset");
        let report = bridge.step(&mut sim, &mut panel);

        assert_eq!(report.inputs.len(), 2);
        assert_eq!(report.tick.sent.len(), 4);
    }

    #[test]
    fn input_limit_defers_extra_lines() {
        let config = SyncConfig {
            max_input_lines_per_tick: 2,
            ..SyncConfig::legacy()
        };
        let mut bridge = Bridge::new(config).unwrap();
        let mut sim = FakeSim::default();
        let mut panel = FakePanel::default();
        for _ in 0..3 {
            panel.push_line("cmd=OuterDown");
        }

        let report = bridge.step(&mut sim, &mut panel);
        assert_eq!(report.inputs.len(), 2);

        let report = bridge.step(&mut sim, &mut panel);
        assert_eq!(report.inputs.len(), 1);
        assert_eq!(sim.commands.len(), 3);
    }

    #[test]
    fn input_read_failure_still_syncs() {
        let mut bridge = Bridge::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        panel.fail_read_line = true;

        let report = bridge.step(&mut sim, &mut panel);

        assert!(report.input_error.as_ref().is_some_and(|e| e.is_transport()));
        assert!(report.inputs.is_empty());
        assert!(!report.is_success());
        assert_eq!(report.tick.sent.len(), 4);

        panel.fail_read_line = false;
        panel.push_line("cmd=Swap");
        let report = bridge.step(&mut sim, &mut panel);

        assert!(report.input_error.is_none());
        assert_eq!(report.inputs.len(), 1);
        assert!(report.is_success());
    }

    #[test]
    fn command_failure_stops_input_phase() {
        let mut bridge = Bridge::new(SyncConfig::default()).unwrap();
        let mut sim = full_sim();
        let mut panel = FakePanel::default();
        sim.fail_commands = true;
        panel.push_line("cmd=Swap");
        panel.push_line("cmd=InnerUp");

        let report = bridge.step(&mut sim, &mut panel);

        assert!(report.input_error.as_ref().is_some_and(|e| e.is_transport()));
        assert!(sim.commands.is_empty());
        // The second line waits for the next step
        assert_eq!(panel.lines.len(), 1);
        assert_eq!(report.tick.sent.len(), 4);

        sim.fail_commands = false;
        let report = bridge.step(&mut sim, &mut panel);

        assert!(report.is_success());
        assert_eq!(sim.commands, vec!["AirbusFBW/RMP1FreqUpSml"]);
        assert!(!report.tick.changed());
    }
}

// ============================================================================
// Session Tests
// ============================================================================

mod session_tests {
    use super::*;

    #[test]
    fn open_subscribes_registered_channels() {
        let session = Session::open(SyncConfig::legacy(), FakeSim::default(), FakePanel::default())
            .unwrap();

        assert_eq!(
            session.telemetry().subscribed,
            vec![DEFAULT_ACTIVE_FREQUENCY, DEFAULT_STANDBY_FREQUENCY]
        );
    }

    #[test]
    fn drop_tears_down_both_links() {
        let sim = full_sim();
        let panel = FakePanel::default();
        let shutdown = Rc::clone(&sim.shutdown);
        let closed = Rc::clone(&panel.closed);

        {
            let mut session = Session::open(SyncConfig::default(), sim, panel).unwrap();
            let report = session.step();
            assert_eq!(report.tick.sent.len(), 4);
            assert_eq!(session.device().flushes, 1);
        }

        assert!(*shutdown.borrow());
        assert!(*closed.borrow());
    }

    #[test]
    fn failed_open_still_tears_down() {
        let sim = FakeSim {
            fail_subscribe_after: Some(2),
            ..FakeSim::default()
        };
        let panel = FakePanel::default();
        let shutdown = Rc::clone(&sim.shutdown);
        let closed = Rc::clone(&panel.closed);

        let result = Session::open(SyncConfig::default(), sim, panel);

        assert!(result.is_err());
        assert!(*shutdown.borrow());
        assert!(*closed.borrow());
    }

    #[test]
    fn invalid_config_is_rejected_and_tears_down() {
        let sim = FakeSim::default();
        let panel = FakePanel::default();
        let shutdown = Rc::clone(&sim.shutdown);
        let closed = Rc::clone(&panel.closed);

        let config = SyncConfig::default().with_brightness_scale(12);
        let result = Session::open(config, sim, panel);

        assert!(result.is_err());
        assert!(*shutdown.borrow());
        assert!(*closed.borrow());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn com_frequency() -> impl Strategy<Value = u32> {
        (118u32..=136, 0u32..=999).prop_map(|(prefix, suffix)| prefix * 1000 + suffix)
    }

    proptest! {
        #[test]
        fn repeated_reading_sends_once(raw in com_frequency(), repeats in 1usize..5) {
            let mut engine = SyncEngine::new(SyncConfig::legacy()).unwrap();
            let mut sim = FakeSim::default();
            let mut panel = FakePanel::default();
            sim.set(DEFAULT_ACTIVE_FREQUENCY, f64::from(raw));

            let first = engine.tick(&mut sim, &mut panel);
            prop_assert_eq!(first.sent.len(), 1);

            for _ in 0..repeats {
                let report = engine.tick(&mut sim, &mut panel);
                prop_assert!(!report.changed());
            }
            prop_assert_eq!(panel.flushes, 1);
        }

        #[test]
        fn panel_converges_to_last_reading(
            readings in prop::collection::vec(com_frequency(), 1..10)
        ) {
            let mut engine = SyncEngine::new(SyncConfig::legacy()).unwrap();
            let mut sim = FakeSim::default();
            let mut panel = FakePanel::default();

            for &raw in &readings {
                sim.set(DEFAULT_STANDBY_FREQUENCY, f64::from(raw));
                engine.tick(&mut sim, &mut panel);
            }

            let frames = panel.take_frames();
            let last = frames.last().unwrap();
            let expected = Frequency::parse_digits(*readings.last().unwrap()).unwrap();
            prop_assert_eq!(last.frequency(), Some(Ok(expected)));
        }
    }
}
