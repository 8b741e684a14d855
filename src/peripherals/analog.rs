use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};

use crate::logic::thermistor::AnalogSample;

/// Which thermistor channel to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum ChannelId {
    One,
    Two,
}

impl ChannelId {
    pub fn index(&self) -> usize {
        match self {
            ChannelId::One => 0,
            ChannelId::Two => 1,
        }
    }
}

/// Analog inputs feeding the thermistor dividers.
pub trait AnalogInput {
    /// Sample one channel. `None` if nothing could be read, including the
    /// converter not being done yet.
    fn read_raw(&mut self, channel: ChannelId) -> Option<AnalogSample>;
}

/// [`AnalogInput`] over an embedded-hal one-shot ADC with one or two pins.
pub struct AdcInput<A, W, P1, P2> {
    adc: A,
    pin_1: P1,
    pin_2: Option<P2>,
    _word: PhantomData<W>,
}

impl<A, W, P1, P2> AdcInput<A, W, P1, P2>
where
    A: OneShot<A, W, P1> + OneShot<A, W, P2>,
    P1: Channel<A>,
    P2: Channel<A>,
    W: Into<i32>,
{
    pub fn dual(adc: A, pin_1: P1, pin_2: P2) -> Self {
        AdcInput {
            adc,
            pin_1,
            pin_2: Some(pin_2),
            _word: PhantomData,
        }
    }

    pub fn free(self) -> (A, P1, Option<P2>) {
        (self.adc, self.pin_1, self.pin_2)
    }
}

impl<A, W, P> AdcInput<A, W, P, P>
where
    A: OneShot<A, W, P>,
    P: Channel<A>,
    W: Into<i32>,
{
    pub fn single(adc: A, pin_1: P) -> Self {
        AdcInput {
            adc,
            pin_1,
            pin_2: None,
            _word: PhantomData,
        }
    }
}

impl<A, W, P1, P2> AnalogInput for AdcInput<A, W, P1, P2>
where
    A: OneShot<A, W, P1> + OneShot<A, W, P2>,
    P1: Channel<A>,
    P2: Channel<A>,
    W: Into<i32>,
{
    fn read_raw(&mut self, channel: ChannelId) -> Option<AnalogSample> {
        let word = match channel {
            ChannelId::One => <A as OneShot<A, W, P1>>::read(&mut self.adc, &mut self.pin_1).ok()?,
            ChannelId::Two => {
                let pin = self.pin_2.as_mut()?;
                <A as OneShot<A, W, P2>>::read(&mut self.adc, pin).ok()?
            }
        };
        Some(AnalogSample::from_word(word.into()))
    }
}

/// Remembers the last good sample of each channel so a failed conversion
/// can fall back to it.
pub struct ThermistorInputs<I> {
    input: I,
    last: [Option<AnalogSample>; 2],
}

impl<I> ThermistorInputs<I>
where
    I: AnalogInput,
{
    pub fn new(input: I) -> Self {
        ThermistorInputs {
            input,
            last: [None; 2],
        }
    }

    /// Current sample of `channel`, or the last good one if this read failed.
    /// `None` only until the channel has produced its first sample.
    pub fn sample(&mut self, channel: ChannelId) -> Option<AnalogSample> {
        match self.input.read_raw(channel) {
            Some(sample) => {
                self.last[channel.index()] = Some(sample);
                Some(sample)
            }
            None => {
                debug!("ADC read failed on {}, reusing last sample", channel);
                self.last[channel.index()]
            }
        }
    }

    pub fn last(&self, channel: ChannelId) -> Option<AnalogSample> {
        self.last[channel.index()]
    }

    pub fn free(self) -> I {
        self.input
    }
}

#[cfg(test)]
pub mod tests {
    use embedded_hal::adc::{Channel, OneShot};

    use super::{AdcInput, AnalogInput, ChannelId, ThermistorInputs};
    use crate::logic::thermistor::AnalogSample;

    pub struct FakeAdc {
        pub words: [i16; 2],
        pub busy: bool,
    }

    pub struct Ain0;
    pub struct Ain1;

    impl Channel<FakeAdc> for Ain0 {
        type ID = u8;

        fn channel() -> u8 {
            0
        }
    }

    impl Channel<FakeAdc> for Ain1 {
        type ID = u8;

        fn channel() -> u8 {
            1
        }
    }

    impl<P: Channel<FakeAdc, ID = u8>> OneShot<FakeAdc, i16, P> for FakeAdc {
        type Error = ();

        fn read(&mut self, _pin: &mut P) -> nb::Result<i16, ()> {
            if self.busy {
                return Err(nb::Error::WouldBlock);
            }
            Ok(self.words[P::channel() as usize])
        }
    }

    /// Hands out queued samples per channel, `None` once a queue runs dry.
    pub struct QueuedInput {
        pub queues: [std::collections::VecDeque<Option<u16>>; 2],
    }

    impl QueuedInput {
        pub fn new(one: &[Option<u16>], two: &[Option<u16>]) -> Self {
            QueuedInput {
                queues: [one.iter().copied().collect(), two.iter().copied().collect()],
            }
        }
    }

    impl AnalogInput for QueuedInput {
        fn read_raw(&mut self, channel: ChannelId) -> Option<AnalogSample> {
            self.queues[channel.index()]
                .pop_front()
                .flatten()
                .map(AnalogSample::new)
        }
    }

    #[test]
    pub fn reads_both_channels() {
        let adc = FakeAdc {
            words: [512, 900],
            busy: false,
        };
        let mut input: AdcInput<_, i16, _, _> = AdcInput::dual(adc, Ain0, Ain1);
        assert_eq!(input.read_raw(ChannelId::One), Some(AnalogSample::new(512)));
        assert_eq!(input.read_raw(ChannelId::Two), Some(AnalogSample::new(900)));
    }

    #[test]
    pub fn single_channel_has_no_second_input() {
        let adc = FakeAdc {
            words: [300, 900],
            busy: false,
        };
        let mut input: AdcInput<_, i16, _, _> = AdcInput::single(adc, Ain0);
        assert_eq!(input.read_raw(ChannelId::One), Some(AnalogSample::new(300)));
        assert_eq!(input.read_raw(ChannelId::Two), None);
    }

    #[test]
    pub fn converter_words_are_clamped() {
        let adc = FakeAdc {
            words: [-3, 2000],
            busy: false,
        };
        let mut input: AdcInput<_, i16, _, _> = AdcInput::dual(adc, Ain0, Ain1);
        assert_eq!(input.read_raw(ChannelId::One), Some(AnalogSample::new(0)));
        assert_eq!(input.read_raw(ChannelId::Two), Some(AnalogSample::new(1023)));
    }

    #[test]
    pub fn busy_converter_reads_nothing() {
        let adc = FakeAdc {
            words: [512, 512],
            busy: true,
        };
        let mut input: AdcInput<_, i16, _, _> = AdcInput::dual(adc, Ain0, Ain1);
        assert_eq!(input.read_raw(ChannelId::One), None);
    }

    #[test]
    pub fn failed_read_falls_back_to_last_sample() {
        let mut inputs = ThermistorInputs::new(QueuedInput::new(&[Some(400), None], &[]));
        assert_eq!(inputs.sample(ChannelId::One), Some(AnalogSample::new(400)));
        assert_eq!(inputs.sample(ChannelId::One), Some(AnalogSample::new(400)));
        assert_eq!(inputs.last(ChannelId::One), Some(AnalogSample::new(400)));
    }

    #[test]
    pub fn channel_without_any_sample_reads_none() {
        let mut inputs = ThermistorInputs::new(QueuedInput::new(&[Some(400)], &[None]));
        assert_eq!(inputs.sample(ChannelId::Two), None);
        assert_eq!(inputs.last(ChannelId::One), None);
    }
}
