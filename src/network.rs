/// Placeholder for the Wi-Fi station. Marks the radio active and nothing
/// more; no association is attempted.
#[derive(Debug, Default)]
pub struct WifiStub {
    active: bool,
}

impl WifiStub {
    pub const fn new() -> Self {
        Self { active: false }
    }

    pub fn init(&mut self) {
        self.active = true;
        info!("Wi-Fi initialized. Ready for configuration.");
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }
}
