/// One 3-axis reading, in g.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub struct AccelerometerSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<[f32; 3]> for AccelerometerSample {
    fn from([x, y, z]: [f32; 3]) -> Self {
        AccelerometerSample { x, y, z }
    }
}

/// A bus device that can hand out 3-axis vectors.
pub trait VectorSource {
    type Error;

    /// Startup handshake, performed once.
    fn initialize(&mut self) -> Result<(), Self::Error>;

    fn read_vector(&mut self) -> Result<AccelerometerSample, Self::Error>;
}

/// What a single poll produced.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum PollOutcome {
    Fresh(AccelerometerSample),
    /// The transaction failed, this is the last sample that didn't.
    Stale(AccelerometerSample),
}

impl PollOutcome {
    pub fn sample(&self) -> AccelerometerSample {
        match self {
            PollOutcome::Fresh(sample) | PollOutcome::Stale(sample) => *sample,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, PollOutcome::Fresh(_))
    }
}

/// Keeps the device health flag, the last good sample and the run of failed
/// polls for one accelerometer.
pub struct AccelerometerSampler<D> {
    device: D,
    healthy: bool,
    latest: AccelerometerSample,
    consecutive_failures: u32,
}

impl<D> AccelerometerSampler<D>
where
    D: VectorSource,
{
    pub fn new(device: D) -> Self {
        AccelerometerSampler {
            device,
            healthy: false,
            latest: AccelerometerSample::default(),
            consecutive_failures: 0,
        }
    }

    /// Runs the device handshake. A failed handshake is not retried, the
    /// sampler stays unhealthy for the rest of its life.
    pub fn initialize(&mut self) -> bool {
        self.healthy = self.device.initialize().is_ok();
        if !self.healthy {
            warn!("accelerometer did not acknowledge startup, running degraded");
        }
        self.healthy
    }

    /// Fetch a fresh sample. Errors are absorbed: the stored sample stays as
    /// it was and comes back as [`PollOutcome::Stale`].
    pub fn poll(&mut self) -> PollOutcome {
        match self.device.read_vector() {
            Ok(sample) => {
                self.latest = sample;
                self.consecutive_failures = 0;
                PollOutcome::Fresh(sample)
            }
            Err(_) => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                debug!(
                    "accelerometer poll failed ({} in a row), reusing last sample",
                    self.consecutive_failures
                );
                PollOutcome::Stale(self.latest)
            }
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn latest(&self) -> AccelerometerSample {
        self.latest
    }

    /// Failed polls since the last fresh sample.
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn free(self) -> D {
        self.device
    }
}
