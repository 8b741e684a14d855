#![cfg_attr(target_os = "none", no_main)]
#![cfg_attr(target_os = "none", no_std)]

#[cfg(target_os = "none")]
mod firmware {
    use embedded_hal::timer::CountDown;
    use nrf52840_hal::{
        self as hal,
        gpio::{p0::Parts as P0Parts, Level},
        saadc::{Gain, Reference, Resolution, Saadc, SaadcConfig},
        twim,
        uarte::{self, Baudrate, Parity, Uarte},
        Timer, Twim,
    };

    use sensorlink::{
        self as _, // global logger + panicking-behavior + memory layout
        config::{Config, OutputMode},
        dispatcher::{Dispatcher, SensorState},
        peripherals::{AdcInput, KX224},
    };

    #[cortex_m_rt::entry]
    fn main() -> ! {
        defmt::info!("sensorlink starting");

        let config = match Config::from_build() {
            Ok(config) => config,
            Err(err) => {
                defmt::error!("invalid build configuration: {}, using defaults", err);
                Config::default()
            }
        };
        defmt::info!("{}", config);

        let board = hal::pac::Peripherals::take().unwrap();
        let pins_0 = P0Parts::new(board.P0);

        // Serial link through the interface MCU's virtual COM port
        let uarte_pins = uarte::Pins {
            txd: pins_0.p0_06.into_push_pull_output(Level::High).degrade(),
            rxd: pins_0.p0_08.into_floating_input().degrade(),
            cts: None,
            rts: None,
        };
        let serial = Uarte::new(board.UARTE0, uarte_pins, Parity::EXCLUDED, Baudrate::BAUD9600);
        let tx_buf = cortex_m::singleton!(: [u8; 1] = [0; 1]).unwrap();
        let rx_buf = cortex_m::singleton!(: [u8; 1] = [0; 1]).unwrap();
        let (mut tx, mut rx) = serial.split(tx_buf, rx_buf).unwrap();

        let scl = pins_0.p0_27.into_floating_input().degrade();
        let sda = pins_0.p0_26.into_floating_input().degrade();
        let i2c = Twim::new(board.TWIM0, twim::Pins { scl, sda }, twim::Frequency::K100);
        let accelerometer = KX224::new(i2c);

        // 10 bit, full scale at VDD so samples are ratiometric to the divider supply
        let saadc_config = SaadcConfig {
            resolution: Resolution::_10BIT,
            reference: Reference::VDD1_4,
            gain: Gain::GAIN1_4,
            ..SaadcConfig::default()
        };
        let saadc = Saadc::new(board.SAADC, saadc_config);
        let thermistors: AdcInput<_, i16, _, _> = AdcInput::dual(
            saadc,
            pins_0.p0_03.into_floating_input(),
            pins_0.p0_04.into_floating_input(),
        );

        let mut state = SensorState::new(accelerometer, thermistors);
        let dispatcher = Dispatcher::new(config);

        if let Err(err) = dispatcher.start(&mut state, &mut tx) {
            defmt::error!("serial write failed: {}", defmt::Debug2Format(&err));
        }

        let mut pacer = Timer::periodic(board.TIMER0);
        let continuous = config.output_mode == OutputMode::Continuous;
        if continuous {
            // timer ticks at 1 MHz
            pacer.start(config.report_interval_ms.saturating_mul(1_000));
        }

        loop {
            if let Err(err) = dispatcher.step(&mut state, &mut rx, &mut tx) {
                defmt::error!("serial write failed: {}", defmt::Debug2Format(&err));
            }
            if continuous {
                let _ = nb::block!(pacer.wait());
            }
        }
    }
}

#[cfg(not(target_os = "none"))]
fn main() {}
