extern crate std;

use embedded_hal::digital::{Error, ErrorType, InputPin};
use std::rc::Rc;
use std::sync::Mutex;

#[derive(Debug)]
pub struct TestError;

impl Error for TestError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// A shared fake button pin. Clones observe the same level.
#[derive(Clone, Default)]
pub struct Pin(Rc<Mutex<bool>>);

impl Pin {
    pub fn set_high(&self) {
        *self.0.lock().unwrap() = true;
    }

    pub fn set_low(&self) {
        *self.0.lock().unwrap() = false;
    }
}

impl ErrorType for Pin {
    type Error = TestError;
}

impl InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(*self.0.lock().unwrap())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!*self.0.lock().unwrap())
    }
}
