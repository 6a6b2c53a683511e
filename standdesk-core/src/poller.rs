//! Polling component
//!
//! [`DeskController`] owns the UART and every piece of desk logic. Each
//! [`poll`](DeskController::poll) drains the bytes that have arrived,
//! decodes frames, updates the desk state, advances the countdown and the
//! alarm programmer, then reports changed fields to an observer. It never
//! blocks, so it can run from any periodic task.

use standdesk_protocol::{Button, Decoded, FrameReader};

use crate::config::DeskConfig;
use crate::dispatch::ButtonDispatcher;
use crate::error::DeskError;
use crate::state::{DeskState, DeskTracker, StateDelta};
use crate::timer::{AlarmProgrammer, TimerController, TimerState, TimerTick};
use crate::traits::{DeskObserver, DeskUart, Fields};

/// Bytes pulled from the UART per read
const READ_CHUNK: usize = 32;

/// Rate limiter for repetitive log lines
#[derive(Debug, Clone)]
pub struct LogThrottle {
    interval_ms: u32,
    last_logged_ms: Option<u32>,
    suppressed: u32,
}

impl LogThrottle {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_logged_ms: None,
            suppressed: 0,
        }
    }

    /// Record an occurrence
    ///
    /// Returns `Some(suppressed)` when a line should be logged now, with the
    /// number of occurrences swallowed since the last one.
    pub fn hit(&mut self, now_ms: u32) -> Option<u32> {
        let due = match self.last_logged_ms {
            Some(at) => now_ms.wrapping_sub(at) >= self.interval_ms,
            None => true,
        };
        if due {
            self.last_logged_ms = Some(now_ms);
            Some(core::mem::take(&mut self.suppressed))
        } else {
            self.suppressed = self.suppressed.saturating_add(1);
            None
        }
    }
}

/// What one poll saw on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// Bytes read from the UART
    pub bytes_read: usize,
    /// Valid frames decoded
    pub frames: usize,
    /// Runs of discarded bytes
    pub malformed: usize,
    /// Total bytes discarded
    pub discarded: usize,
    /// Local countdown fired during this poll
    pub timer_done: bool,
}

/// Desk controller driven by periodic polls
pub struct DeskController<U: DeskUart> {
    uart: U,
    reader: FrameReader,
    tracker: DeskTracker,
    timer: TimerController,
    alarm: AlarmProgrammer,
    dispatcher: ButtonDispatcher,
    timer_tick_ms: u32,
    /// Elapsed poll time not yet turned into countdown ticks
    tick_accum_ms: u32,
    last_poll_ms: Option<u32>,
    /// When the countdown was last (re)started, until the next poll
    timer_set_ms: Option<u32>,
    malformed_log: LogThrottle,
}

impl<U: DeskUart> DeskController<U> {
    pub fn new(uart: U, config: &DeskConfig) -> Self {
        let timing = &config.timing;
        Self {
            uart,
            reader: FrameReader::new(),
            tracker: DeskTracker::new(timing.link_timeout_ms, timing.debounce_ms),
            timer: TimerController::new(),
            alarm: AlarmProgrammer::new(timing.alarm_retry_ms),
            dispatcher: ButtonDispatcher::new(config.buttons.clone()),
            timer_tick_ms: timing.timer_tick_ms.max(1),
            tick_accum_ms: 0,
            last_poll_ms: None,
            timer_set_ms: None,
            malformed_log: LogThrottle::new(timing.malformed_log_interval_ms),
        }
    }

    /// Current desk state
    pub fn state(&self) -> &DeskState {
        self.tracker.state()
    }

    pub fn timer(&self) -> &TimerController {
        &self.timer
    }

    pub fn alarm(&self) -> &AlarmProgrammer {
        &self.alarm
    }

    pub fn uart(&self) -> &U {
        &self.uart
    }

    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Press a handset button
    pub fn press(&mut self, button: Button) -> Result<(), DeskError> {
        self.dispatcher.press(&mut self.uart, button)
    }

    /// Press a handset button by configuration name
    pub fn press_named(&mut self, name: &str) -> Result<(), DeskError> {
        self.dispatcher.press_named(&mut self.uart, name)
    }

    /// Start or restart the local countdown at `now_ms`
    ///
    /// The state mirrors the new countdown on the next poll. Only time after
    /// `now_ms` counts towards it.
    pub fn set_timer(&mut self, duration: u8, now_ms: u32) -> Result<(), DeskError> {
        self.timer.set_timer(duration)?;
        self.tick_accum_ms = 0;
        self.timer_set_ms = Some(now_ms);

        #[cfg(feature = "defmt")]
        defmt::info!("Timer set to {} s", duration);

        Ok(())
    }

    /// Stop the local countdown without firing
    pub fn cancel_timer(&mut self) -> bool {
        let cancelled = self.timer.cancel();
        if cancelled {
            #[cfg(feature = "defmt")]
            defmt::info!("Timer cancelled");
        }
        cancelled
    }

    /// Program the desk's own alarm to `minutes`
    ///
    /// Button presses continue from later polls as the display follows.
    pub fn program_alarm(&mut self, minutes: u8) -> Result<(), DeskError> {
        let state = *self.tracker.state();
        let next = self
            .alarm
            .start(minutes, state.control_status, state.alarm_minutes)?;
        if let Some(button) = next {
            self.press(button)?;
        }
        Ok(())
    }

    /// Run one poll cycle
    pub fn poll<O: DeskObserver + ?Sized>(&mut self, now_ms: u32, observer: &mut O) -> PollReport {
        let mut report = PollReport::default();
        let mut delta = StateDelta::default();

        self.drain_uart(now_ms, &mut report, &mut delta);

        delta.merge(self.tracker.check_link(now_ms));
        delta.merge(self.tracker.update_alarm_countdown(now_ms));

        report.timer_done = self.advance_timer(now_ms);
        delta.merge(
            self.tracker
                .set_timer(self.timer.is_active(), self.timer.remaining()),
        );

        let state = *self.tracker.state();
        if let Some(button) = self
            .alarm
            .poll(now_ms, state.control_status, state.alarm_minutes)
        {
            self.press_for_alarm(button);
        }

        self.last_poll_ms = Some(now_ms);
        publish(&delta, report.timer_done, observer);
        report
    }

    /// Read and decode everything already received
    fn drain_uart(&mut self, now_ms: u32, report: &mut PollReport, delta: &mut StateDelta) {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let room = self.reader.capacity_left().min(READ_CHUNK);
            if room == 0 {
                // Unreachable with a sane decoder; drop the backlog rather than stall
                self.reader.reset();
                continue;
            }

            let count = match self.uart.read_available(&mut buf[..room]) {
                Ok(0) => break,
                Ok(count) => count,
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("UART read failed");
                    break;
                }
            };
            report.bytes_read += count;

            if self.reader.extend(&buf[..count]).is_err() {
                self.reader.reset();
                continue;
            }

            self.process_frames(now_ms, report, delta);
        }
    }

    fn process_frames(&mut self, now_ms: u32, report: &mut PollReport, delta: &mut StateDelta) {
        loop {
            match self.reader.next_event() {
                Decoded::NeedMoreData => break,
                Decoded::Malformed { discarded } => {
                    report.malformed += 1;
                    report.discarded += discarded;
                    if let Some(_suppressed) = self.malformed_log.hit(now_ms) {
                        #[cfg(feature = "defmt")]
                        defmt::warn!(
                            "Discarded {} malformed bytes ({} similar suppressed)",
                            discarded,
                            _suppressed
                        );
                    }
                }
                Decoded::Frame(frame) => {
                    report.frames += 1;
                    let frame_delta = self.tracker.apply(&frame, now_ms);
                    self.follow_alarm(&frame_delta, now_ms);
                    delta.merge(frame_delta);
                }
            }
        }
    }

    /// Let the alarm programmer react to a frame's changes
    fn follow_alarm(&mut self, frame_delta: &StateDelta, now_ms: u32) {
        if !self.alarm.is_busy() {
            return;
        }
        let state = *self.tracker.state();
        let next = if let Some(status) = frame_delta.control_status {
            self.alarm.on_status_changed(status, state.alarm_minutes)
        } else if frame_delta.alarm_minutes.is_some() {
            self.alarm
                .on_minutes_changed(state.control_status, state.alarm_minutes, now_ms)
        } else {
            None
        };
        if let Some(button) = next {
            self.press_for_alarm(button);
        }
    }

    fn press_for_alarm(&mut self, button: Button) {
        if let Err(_e) = self.press(button) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Alarm programming press failed: {:?}", _e);
            self.alarm.cancel();
        }
    }

    /// Turn elapsed poll time into countdown ticks; true when it fired
    fn advance_timer(&mut self, now_ms: u32) -> bool {
        let elapsed = self
            .timer_set_ms
            .take()
            .or(self.last_poll_ms)
            .map(|since| now_ms.wrapping_sub(since))
            .unwrap_or(0);

        if self.timer.state() == TimerState::Idle {
            self.tick_accum_ms = 0;
            return false;
        }

        self.tick_accum_ms = self.tick_accum_ms.saturating_add(elapsed);
        let mut fired = false;
        while self.tick_accum_ms >= self.timer_tick_ms {
            self.tick_accum_ms -= self.timer_tick_ms;
            match self.timer.tick() {
                TimerTick::Fired => {
                    #[cfg(feature = "defmt")]
                    defmt::info!("Timer done");
                    fired = true;
                }
                TimerTick::Counting(_) => {}
                TimerTick::Idle => {
                    self.tick_accum_ms = 0;
                    break;
                }
            }
        }
        fired
    }
}

/// Report changed fields the observer subscribed to
fn publish<O: DeskObserver + ?Sized>(delta: &StateDelta, timer_done: bool, observer: &mut O) {
    let interests = observer.interests();

    if let Some(connected) = delta.connected.filter(|_| interests.contains(Fields::CONNECTED)) {
        observer.on_connected(connected);
    }
    if let Some(moving) = delta.moving.filter(|_| interests.contains(Fields::MOVING)) {
        observer.on_moving(moving);
    }
    if let Some(height) = delta.height_cm.filter(|_| interests.contains(Fields::HEIGHT)) {
        observer.on_height(height);
    }
    if let Some(active) = delta
        .timer_active
        .filter(|_| interests.contains(Fields::TIMER_ACTIVE))
    {
        observer.on_timer_active(active);
    }
    if let Some(seconds) = delta
        .timer_seconds
        .filter(|_| interests.contains(Fields::TIMER_SECONDS))
    {
        observer.on_timer_seconds(seconds);
    }
    if let Some(status) = delta
        .control_status
        .filter(|_| interests.contains(Fields::CONTROL_STATUS))
    {
        observer.on_control_status(status);
    }
    if let Some(active) = delta
        .alarm_active
        .filter(|_| interests.contains(Fields::ALARM_ACTIVE))
    {
        observer.on_alarm_active(active);
    }
    if let Some(minutes) = delta
        .alarm_minutes
        .filter(|_| interests.contains(Fields::ALARM_MINUTES))
    {
        observer.on_alarm_minutes(minutes);
    }
    if let Some(seconds) = delta
        .alarm_seconds
        .filter(|_| interests.contains(Fields::ALARM_SECONDS))
    {
        observer.on_alarm_seconds(seconds);
    }
    if timer_done && interests.contains(Fields::TIMER_DONE) {
        observer.on_timer_done();
    }
    if delta.alarm_done && interests.contains(Fields::ALARM_DONE) {
        observer.on_alarm_done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockUart;
    use crate::state::ControlStatus;
    use standdesk_protocol::{ButtonCommand, DeskMessage, SegmentDisplay};
    use std::vec::Vec;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Connected(bool),
        Moving(bool),
        Height(f32),
        TimerActive(bool),
        TimerSeconds(u8),
        Status(ControlStatus),
        AlarmActive(bool),
        AlarmMinutes(u8),
        AlarmSeconds(u16),
        TimerDone,
        AlarmDone,
    }

    struct Recorder {
        interests: Fields,
        events: Vec<Event>,
    }

    impl Recorder {
        fn new() -> Self {
            Self::with_interests(Fields::ALL)
        }

        fn with_interests(interests: Fields) -> Self {
            Self {
                interests,
                events: Vec::new(),
            }
        }

        fn count(&self, event: &Event) -> usize {
            self.events.iter().filter(|e| *e == event).count()
        }
    }

    impl DeskObserver for Recorder {
        fn interests(&self) -> Fields {
            self.interests
        }
        fn on_connected(&mut self, connected: bool) {
            self.events.push(Event::Connected(connected));
        }
        fn on_moving(&mut self, moving: bool) {
            self.events.push(Event::Moving(moving));
        }
        fn on_height(&mut self, height_cm: f32) {
            self.events.push(Event::Height(height_cm));
        }
        fn on_timer_active(&mut self, active: bool) {
            self.events.push(Event::TimerActive(active));
        }
        fn on_timer_seconds(&mut self, seconds: u8) {
            self.events.push(Event::TimerSeconds(seconds));
        }
        fn on_control_status(&mut self, status: ControlStatus) {
            self.events.push(Event::Status(status));
        }
        fn on_alarm_active(&mut self, active: bool) {
            self.events.push(Event::AlarmActive(active));
        }
        fn on_alarm_minutes(&mut self, minutes: u8) {
            self.events.push(Event::AlarmMinutes(minutes));
        }
        fn on_alarm_seconds(&mut self, seconds: u16) {
            self.events.push(Event::AlarmSeconds(seconds));
        }
        fn on_timer_done(&mut self) {
            self.events.push(Event::TimerDone);
        }
        fn on_alarm_done(&mut self) {
            self.events.push(Event::AlarmDone);
        }
    }

    fn controller() -> DeskController<MockUart> {
        DeskController::new(MockUart::new(), &DeskConfig::default())
    }

    fn display_bytes(display: SegmentDisplay) -> heapless::Vec<u8, 15> {
        DeskMessage::display_frame(&display).encode_to_vec()
    }

    fn height_bytes(cm: f32) -> heapless::Vec<u8, 15> {
        display_bytes(SegmentDisplay::from_height(cm).unwrap())
    }

    fn minutes_bytes(minutes: u8) -> heapless::Vec<u8, 15> {
        display_bytes(SegmentDisplay::from_alarm_minutes(minutes, true).unwrap())
    }

    fn key_frame(button: Button) -> heapless::Vec<u8, 15> {
        ButtonCommand::with_default_key(button).encode()
    }

    #[test]
    fn test_press_up_writes_configured_bytes() {
        let mut desk = controller();
        desk.press(Button::Up).unwrap();
        assert_eq!(
            desk.uart().written(),
            &[0x9B, 0x06, 0x02, 0x01, 0x00, 0xFC, 0xA0, 0x9D]
        );
    }

    #[test]
    fn test_press_named_unknown() {
        let mut desk = controller();
        assert_eq!(desk.press_named("stand"), Err(DeskError::UnknownButton(None)));
        assert!(desk.uart().written().is_empty());
    }

    #[test]
    fn test_poll_publishes_height() {
        let mut desk = controller();
        let mut observer = Recorder::new();

        desk.uart_mut().feed(&display_bytes(SegmentDisplay::off()));
        desk.uart_mut().feed(&height_bytes(72.5));
        let report = desk.poll(0, &mut observer);

        assert_eq!(report.frames, 2);
        assert_eq!(report.malformed, 0);
        assert!(desk.state().connected);
        assert_eq!(desk.state().height_cm, 72.5);
        assert_eq!(observer.count(&Event::Connected(true)), 1);
        assert_eq!(observer.count(&Event::Height(72.5)), 1);
        assert_eq!(observer.count(&Event::Status(ControlStatus::Height)), 1);
    }

    #[test]
    fn test_frame_split_across_polls() {
        let mut desk = controller();
        let bytes = height_bytes(80.0);

        desk.uart_mut().feed(&bytes[..4]);
        let report = desk.poll(0, &mut ());
        assert_eq!(report.frames, 0);
        assert!(!desk.state().connected);

        desk.uart_mut().feed(&bytes[4..]);
        let report = desk.poll(100, &mut ());
        assert_eq!(report.frames, 1);
        assert!(desk.state().connected);
    }

    #[test]
    fn test_small_reads() {
        let mut desk = controller();
        desk.uart_mut().set_max_read(3);
        for _ in 0..10 {
            desk.uart_mut().feed(&display_bytes(SegmentDisplay::off()));
        }

        let report = desk.poll(0, &mut ());
        assert_eq!(report.frames, 10);
        assert_eq!(desk.uart().pending(), 0);
    }

    #[test]
    fn test_resync_after_corruption() {
        let mut desk = controller();
        let mut observer = Recorder::new();

        let mut corrupt = height_bytes(72.5);
        corrupt[4] ^= 0x55;
        desk.uart_mut().feed(&[0x00, 0x9B, 0xFF]);
        desk.uart_mut().feed(&corrupt);
        desk.uart_mut().feed(&height_bytes(72.5));

        let report = desk.poll(0, &mut observer);
        assert_eq!(report.malformed, 1);
        assert_eq!(report.discarded, 3 + corrupt.len());
        assert_eq!(report.frames, 1);
        assert_eq!(observer.count(&Event::Height(72.5)), 1);
    }

    #[test]
    fn test_resync_with_small_reads() {
        let mut desk = controller();
        desk.uart_mut().set_max_read(3);

        let mut corrupt = height_bytes(72.5);
        corrupt[1] = 0x52;
        desk.uart_mut().feed(&corrupt);
        desk.uart_mut().feed(&height_bytes(72.5));

        let report = desk.poll(0, &mut ());
        assert_eq!(report.malformed, 1);
        assert_eq!(report.discarded, corrupt.len());
        assert_eq!(report.frames, 1);
    }

    #[test]
    fn test_key_echo_only_refreshes_link() {
        let mut desk = controller();
        desk.uart_mut().feed(&key_frame(Button::Up));
        let report = desk.poll(0, &mut ());

        assert_eq!(report.frames, 1);
        assert!(desk.state().connected);
        assert_eq!(desk.state().control_status, ControlStatus::Unknown);
    }

    #[test]
    fn test_link_timeout_after_two_silent_polls() {
        let mut desk = controller();
        let mut observer = Recorder::new();

        desk.uart_mut().feed(&display_bytes(SegmentDisplay::off()));
        desk.uart_mut().feed(&height_bytes(72.5));
        desk.poll(0, &mut observer);
        desk.uart_mut().feed(&height_bytes(73.0));
        desk.poll(500, &mut observer);
        assert!(desk.state().moving);

        observer.events.clear();
        desk.poll(1000, &mut observer);
        assert!(observer.events.is_empty());

        desk.poll(1500, &mut observer);
        assert!(!desk.state().connected);
        assert!(!desk.state().moving);
        assert_eq!(observer.count(&Event::Connected(false)), 1);
        assert_eq!(observer.count(&Event::Moving(false)), 1);
    }

    #[test]
    fn test_reconnect_after_timeout() {
        let mut desk = controller();
        desk.uart_mut().feed(&display_bytes(SegmentDisplay::off()));
        desk.poll(0, &mut ());
        desk.poll(2000, &mut ());
        assert!(!desk.state().connected);

        desk.uart_mut().feed(&display_bytes(SegmentDisplay::off()));
        desk.poll(2500, &mut ());
        assert!(desk.state().connected);
    }

    #[test]
    fn test_timer_counts_down_and_fires_once() {
        let mut desk = controller();
        let mut observer = Recorder::new();

        desk.set_timer(3, 0).unwrap();
        let mut fired = 0;
        let mut now = 0;
        while now <= 10_000 {
            if desk.poll(now, &mut observer).timer_done {
                fired += 1;
                assert_eq!(now, 3000);
            }
            now += 500;
        }

        assert_eq!(fired, 1);
        assert_eq!(observer.count(&Event::TimerDone), 1);
        assert_eq!(observer.count(&Event::TimerActive(true)), 1);
        assert_eq!(observer.count(&Event::TimerActive(false)), 1);

        let seconds: Vec<u8> = observer
            .events
            .iter()
            .filter_map(|e| match e {
                Event::TimerSeconds(s) => Some(*s),
                _ => None,
            })
            .collect();
        assert_eq!(seconds, [3, 2, 1, 0]);
        assert!(!desk.state().timer_active);
    }

    #[test]
    fn test_timer_set_between_polls() {
        let mut desk = controller();

        desk.poll(0, &mut ());
        desk.set_timer(1, 499).unwrap();
        assert!(!desk.poll(500, &mut ()).timer_done);
        assert!(!desk.poll(1000, &mut ()).timer_done);
        assert_eq!(desk.state().timer_seconds, 1);
        assert!(desk.poll(1500, &mut ()).timer_done);
    }

    #[test]
    fn test_timer_restart_discards_elapsed_time() {
        let mut desk = controller();

        desk.set_timer(2, 0).unwrap();
        desk.poll(0, &mut ());
        desk.poll(900, &mut ());
        desk.set_timer(2, 950).unwrap();
        assert!(!desk.poll(1000, &mut ()).timer_done);
        assert_eq!(desk.state().timer_seconds, 2);
        assert!(!desk.poll(1950, &mut ()).timer_done);
        assert_eq!(desk.state().timer_seconds, 1);
        assert!(desk.poll(2950, &mut ()).timer_done);
    }

    #[test]
    fn test_timer_rejects_out_of_range() {
        let mut desk = controller();
        assert_eq!(desk.set_timer(0, 0), Err(DeskError::InvalidDuration(0)));
        assert_eq!(desk.set_timer(100, 0), Err(DeskError::InvalidDuration(100)));
        desk.poll(0, &mut ());
        assert!(!desk.state().timer_active);
    }

    #[test]
    fn test_cancel_timer() {
        let mut desk = controller();
        let mut observer = Recorder::new();

        desk.set_timer(5, 0).unwrap();
        desk.poll(0, &mut observer);
        desk.poll(1000, &mut observer);
        assert!(desk.cancel_timer());
        for step in 2..10 {
            desk.poll(step * 1000, &mut observer);
        }

        assert_eq!(observer.count(&Event::TimerDone), 0);
        assert!(!desk.state().timer_active);
        assert_eq!(desk.state().timer_seconds, 0);
        assert!(!desk.cancel_timer());
    }

    #[test]
    fn test_interests_filter_fields() {
        let mut desk = controller();
        let mut observer = Recorder::with_interests(Fields::HEIGHT);

        desk.uart_mut().feed(&display_bytes(SegmentDisplay::off()));
        desk.uart_mut().feed(&height_bytes(72.5));
        desk.poll(0, &mut observer);

        assert_eq!(observer.events, [Event::Height(72.5)]);
    }

    #[test]
    fn test_alarm_done_published() {
        let mut desk = controller();
        let mut observer = Recorder::new();

        desk.uart_mut().feed(&minutes_bytes(1));
        desk.poll(0, &mut observer);
        assert_eq!(observer.count(&Event::AlarmActive(true)), 1);
        assert_eq!(observer.count(&Event::AlarmMinutes(1)), 1);

        desk.uart_mut().feed(&minutes_bytes(0));
        desk.poll(500, &mut observer);
        assert_eq!(observer.count(&Event::AlarmDone), 1);
        assert_eq!(desk.state().control_status, ControlStatus::TimerDone);
    }

    #[test]
    fn test_alarm_seconds_estimate() {
        let mut desk = controller();
        let mut observer = Recorder::with_interests(Fields::ALARM_SECONDS);

        desk.uart_mut().feed(&display_bytes(
            SegmentDisplay::from_alarm_minutes(2, false).unwrap(),
        ));
        desk.poll(0, &mut observer);
        desk.poll(500, &mut observer);
        desk.poll(1000, &mut observer);
        desk.poll(2500, &mut observer);
        assert_eq!(
            observer.events,
            [
                Event::AlarmSeconds(120),
                Event::AlarmSeconds(119),
                Event::AlarmSeconds(118),
            ]
        );

        // Display reaches 1 minute early: estimate snaps to it
        desk.uart_mut().feed(&display_bytes(
            SegmentDisplay::from_alarm_minutes(1, false).unwrap(),
        ));
        desk.poll(3000, &mut observer);
        assert_eq!(observer.events.last(), Some(&Event::AlarmSeconds(60)));
        assert_eq!(desk.state().alarm_seconds, 60);
    }

    #[test]
    fn test_program_alarm_walks_menu() {
        let mut desk = controller();
        let timer = key_frame(Button::Timer);
        let up = key_frame(Button::Up);

        desk.uart_mut().feed(&display_bytes(SegmentDisplay::off()));
        desk.poll(0, &mut ());

        desk.program_alarm(3).unwrap();
        assert_eq!(desk.uart_mut().take_written(), timer.as_slice());

        // " ON" splash: wait for the editor
        desk.uart_mut().feed(&display_bytes(SegmentDisplay::timer_on()));
        desk.poll(100, &mut ());
        assert_eq!(desk.state().control_status, ControlStatus::TimerStarting);
        assert!(desk.uart().written().is_empty());

        // Editor opens at 1 minute
        desk.uart_mut().feed(&minutes_bytes(1));
        desk.poll(200, &mut ());
        assert_eq!(desk.state().control_status, ControlStatus::TimerChange);
        assert_eq!(desk.uart_mut().take_written(), up.as_slice());

        // Display follows to 2: next press after the retry delay
        desk.uart_mut().feed(&minutes_bytes(2));
        desk.poll(300, &mut ());
        assert!(desk.uart().written().is_empty());
        desk.poll(408, &mut ());
        assert_eq!(desk.uart_mut().take_written(), up.as_slice());

        // On target: start the alarm
        desk.uart_mut().feed(&minutes_bytes(3));
        desk.poll(500, &mut ());
        assert_eq!(desk.uart_mut().take_written(), timer.as_slice());
        assert!(!desk.alarm().is_busy());
    }

    #[test]
    fn test_program_alarm_waits_for_movement() {
        let mut desk = controller();
        let timer = key_frame(Button::Timer);

        desk.uart_mut().feed(&display_bytes(SegmentDisplay::off()));
        desk.poll(0, &mut ());
        desk.uart_mut().feed(&height_bytes(72.5));
        desk.poll(100, &mut ());
        desk.uart_mut().feed(&height_bytes(73.0));
        desk.poll(200, &mut ());
        assert_eq!(desk.state().control_status, ControlStatus::Moving);

        desk.program_alarm(5).unwrap();
        assert!(desk.uart().written().is_empty());
        assert!(desk.alarm().is_busy());

        // Height holds still: the desk stopped
        desk.uart_mut().feed(&height_bytes(73.0));
        desk.poll(1300, &mut ());
        assert_eq!(desk.state().control_status, ControlStatus::Height);
        assert_eq!(desk.uart_mut().take_written(), timer.as_slice());

        // Display went dark instead of opening the menu
        desk.uart_mut().feed(&display_bytes(SegmentDisplay::off()));
        desk.poll(1400, &mut ());
        assert_eq!(desk.state().control_status, ControlStatus::Off);
        assert_eq!(desk.uart_mut().take_written(), timer.as_slice());

        desk.uart_mut().feed(&display_bytes(SegmentDisplay::timer_on()));
        desk.poll(1500, &mut ());
        assert_eq!(desk.state().control_status, ControlStatus::TimerStarting);
        assert!(desk.uart().written().is_empty());
        assert!(desk.alarm().is_busy());
    }

    #[test]
    fn test_program_alarm_invalid() {
        let mut desk = controller();
        assert_eq!(desk.program_alarm(0), Err(DeskError::InvalidDuration(0)));
        assert!(desk.uart().written().is_empty());
    }

    #[test]
    fn test_log_throttle() {
        let mut throttle = LogThrottle::new(5000);
        assert_eq!(throttle.hit(0), Some(0));
        assert_eq!(throttle.hit(100), None);
        assert_eq!(throttle.hit(200), None);
        assert_eq!(throttle.hit(5000), Some(2));
        assert_eq!(throttle.hit(5001), None);
    }
}
