use embedded_hal::blocking::i2c;

use super::accelerometer::{AccelerometerSample, VectorSource};

/// Address with the ADDR pin pulled low, as on the Rohm sensor shield.
pub const DEFAULT_ADDRESS: u8 = 0x1E;

const XOUT_L: u8 = 0x06;
const WHO_AM_I: u8 = 0x0F;
const CNTL1: u8 = 0x18;
const ODCNTL: u8 = 0x1B;

pub const WHO_AM_I_VALUE: u8 = 0x2B;

const CNTL1_PC1: u8 = 0x80;
const CNTL1_RES: u8 = 0x40;
const CNTL1_GSEL_8G: u8 = 0x08;
const ODCNTL_OSA_50HZ: u8 = 0x02;

/// Counts per g in the ±8 g range at 16 bit resolution.
const SENSITIVITY_8G: f32 = 4096.;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_os = "none", derive(defmt::Format))]
pub enum Kx224Error<E> {
    Bus(E),
    /// WHO_AM_I answered with something other than [`WHO_AM_I_VALUE`].
    UnexpectedDeviceId(u8),
}

/// KX224 3-axis accelerometer.
pub struct KX224<T> {
    i2c: T,
    address: u8,
}

impl<T> KX224<T>
where
    T: i2c::Write,
    T: i2c::WriteRead<Error = <T as i2c::Write>::Error>,
{
    pub fn new(i2c: T) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: T, address: u8) -> Self {
        KX224 { i2c, address }
    }

    pub fn who_am_i(&mut self) -> Result<u8, <T as i2c::Write>::Error> {
        let mut buf = [0; 1];
        self.i2c.write_read(self.address, &[WHO_AM_I], &mut buf)?;
        Ok(buf[0])
    }

    /// Check the device id, then configure ±8 g / 50 Hz and enter operating
    /// mode. Range settings only take effect while PC1 is cleared, hence the
    /// two writes to CNTL1.
    pub fn init(&mut self) -> Result<(), Kx224Error<<T as i2c::Write>::Error>> {
        let id = self.who_am_i().map_err(Kx224Error::Bus)?;
        if id != WHO_AM_I_VALUE {
            return Err(Kx224Error::UnexpectedDeviceId(id));
        }

        let cntl1 = CNTL1_RES | CNTL1_GSEL_8G;
        self.write_register(CNTL1, cntl1)?;
        self.write_register(ODCNTL, ODCNTL_OSA_50HZ)?;
        self.write_register(CNTL1, cntl1 | CNTL1_PC1)?;

        Ok(())
    }

    fn write_register(
        &mut self,
        register: u8,
        value: u8,
    ) -> Result<(), Kx224Error<<T as i2c::Write>::Error>> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(Kx224Error::Bus)
    }

    pub fn read_raw(&mut self) -> Result<[i16; 3], <T as i2c::Write>::Error> {
        let mut buf = [0; 6];
        self.i2c.write_read(self.address, &[XOUT_L], &mut buf)?;

        Ok([
            i16::from_le_bytes([buf[0], buf[1]]),
            i16::from_le_bytes([buf[2], buf[3]]),
            i16::from_le_bytes([buf[4], buf[5]]),
        ])
    }

    pub fn read_acceleration(&mut self) -> Result<AccelerometerSample, <T as i2c::Write>::Error> {
        let [x, y, z] = self.read_raw()?;
        Ok(AccelerometerSample {
            x: x as f32 / SENSITIVITY_8G,
            y: y as f32 / SENSITIVITY_8G,
            z: z as f32 / SENSITIVITY_8G,
        })
    }

    pub fn free(self) -> T {
        self.i2c
    }
}

impl<T> VectorSource for KX224<T>
where
    T: i2c::Write,
    T: i2c::WriteRead<Error = <T as i2c::Write>::Error>,
{
    type Error = Kx224Error<<T as i2c::Write>::Error>;

    fn initialize(&mut self) -> Result<(), Self::Error> {
        self.init()
    }

    fn read_vector(&mut self) -> Result<AccelerometerSample, Self::Error> {
        self.read_acceleration().map_err(Kx224Error::Bus)
    }
}
