use crate::error::GeolocationError;
use crate::types::Coordinates;

/// Source of the user's current position.
pub trait Locator {
    fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Position supplied up front (command line or environment).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLocator {
    position: Option<Coordinates>,
}

impl FixedLocator {
    pub const fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }
}

impl Locator for FixedLocator {
    fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.position.ok_or(GeolocationError::PositionUnavailable)
    }
}

/// A locator that always fails with the given error.
#[derive(Debug, Clone, Copy)]
pub struct FailingLocator(pub GeolocationError);

impl Locator for FailingLocator {
    fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_locator_without_position_is_unavailable() {
        let l = FixedLocator::new(None);
        assert_eq!(
            l.current_position(),
            Err(GeolocationError::PositionUnavailable)
        );
        let here = Coordinates::new(48.85, 2.35);
        assert_eq!(FixedLocator::new(Some(here)).current_position(), Ok(here));
    }
}
