//! Scoped streaming session

use std::sync::Arc;

use contracts::{FrameCallback, Result, Sensor, SensorState, StreamProfile};
use tracing::{error, instrument};

/// Owns an opened sensor until released
///
/// Whatever path leaves the scope, `stop` (when started) and then `close`
/// run exactly once each.
pub struct StreamSession {
    sensor: Arc<dyn Sensor>,
    streaming: bool,
    open: bool,
}

impl StreamSession {
    /// Open `profiles` on `sensor`
    #[instrument(name = "session_open", skip_all, fields(sensor = %sensor.name()))]
    pub fn open(sensor: Arc<dyn Sensor>, profiles: &[StreamProfile]) -> Result<Self> {
        sensor.open(profiles)?;
        Ok(Self {
            sensor,
            streaming: false,
            open: true,
        })
    }

    /// Register the frame handler
    ///
    /// A second call while streaming fails with `AlreadyStreaming` and leaves
    /// the first handler running.
    pub fn start(&mut self, callback: FrameCallback) -> Result<()> {
        self.sensor.start(callback)?;
        self.streaming = true;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.sensor.stop()?;
        self.streaming = false;
        Ok(())
    }

    pub fn sensor(&self) -> &Arc<dyn Sensor> {
        &self.sensor
    }

    pub fn state(&self) -> SensorState {
        self.sensor.state()
    }

    /// Stop and close now, reporting the first failure
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        let mut first_error = None;

        if self.streaming {
            self.streaming = false;
            // already stopped through `sensor()` or from its own frame handler
            if self.sensor.state() == SensorState::Streaming {
                if let Err(e) = self.sensor.stop() {
                    first_error = Some(e);
                }
            }
        }
        if self.open {
            self.open = false;
            if let Err(e) = self.sensor.close() {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            error!(sensor = %self.sensor.name(), error = %e, "session release failed");
        }
    }
}
