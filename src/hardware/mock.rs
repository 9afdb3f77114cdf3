//! Scripted sensor sources for testing and the command-line tool

use crate::core::Position;
use crate::hardware::{
    OrientationChannel, OrientationReading, OrientationSource, PositionSource, SensorError,
    SensorResult,
};
use std::collections::VecDeque;

/// Position source replaying queued fixes and errors
#[derive(Debug, Default)]
pub struct MockPositionSource {
    queue: VecDeque<SensorResult<Position>>,
    active: bool,
    start_error: Option<SensorError>,
}

impl MockPositionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `start` fail, as when the user denies location access
    pub fn failing_with(error: SensorError) -> Self {
        Self {
            start_error: Some(error),
            ..Self::default()
        }
    }

    pub fn push_fix(&mut self, position: Position) {
        self.queue.push_back(Ok(position));
    }

    pub fn push_error(&mut self, error: SensorError) {
        self.queue.push_back(Err(error));
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl PositionSource for MockPositionSource {
    fn start(&mut self) -> SensorResult<()> {
        if let Some(error) = self.start_error {
            return Err(error);
        }
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn poll(&mut self) -> SensorResult<Option<Position>> {
        if !self.active {
            return Ok(None);
        }
        self.queue.pop_front().transpose()
    }
}

/// Orientation source replaying queued readings on one channel
#[derive(Debug)]
pub struct MockOrientationSource {
    channel: OrientationChannel,
    queue: VecDeque<OrientationReading>,
    active: bool,
    supported: bool,
}

impl MockOrientationSource {
    pub fn new(channel: OrientationChannel) -> Self {
        Self {
            channel,
            queue: VecDeque::new(),
            active: false,
            supported: true,
        }
    }

    /// Source for a channel the platform does not provide
    pub fn unsupported(channel: OrientationChannel) -> Self {
        Self {
            supported: false,
            ..Self::new(channel)
        }
    }

    /// Queue a reading; its channel is forced to this source's channel
    pub fn push(&mut self, mut reading: OrientationReading) {
        reading.channel = self.channel;
        self.queue.push_back(reading);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl OrientationSource for MockOrientationSource {
    fn channel(&self) -> OrientationChannel {
        self.channel
    }

    fn start(&mut self) -> SensorResult<()> {
        if !self.supported {
            return Err(SensorError::Unavailable);
        }
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn poll(&mut self) -> Option<OrientationReading> {
        if !self.active {
            return None;
        }
        self.queue.pop_front()
    }
}
