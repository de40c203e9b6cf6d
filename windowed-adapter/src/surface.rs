use windowed::Surface;

/// An in-memory [`Surface`] for terminals, servers and tests.
///
/// It simply records what the engine asks for. Hosts that own a real scroll container copy
/// `scroll_top`/`scroll_height` out after each frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeadlessSurface {
    scroll_top: u64,
    client_height: u32,
    scroll_height: u64,
    detached: bool,
}

impl HeadlessSurface {
    pub fn new(client_height: u32) -> Self {
        Self {
            client_height,
            ..Self::default()
        }
    }

    /// Changes the reported viewport height. The engine still needs a resize event to notice.
    pub fn set_client_height(&mut self, client_height: u32) {
        self.client_height = client_height;
    }

    pub fn scroll_height(&self) -> u64 {
        self.scroll_height
    }

    /// Whether the engine has torn down its subscriptions.
    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl Surface for HeadlessSurface {
    fn scroll_top(&self) -> u64 {
        self.scroll_top
    }

    fn client_height(&self) -> u32 {
        self.client_height
    }

    fn set_scroll_top(&mut self, offset: u64) {
        self.scroll_top = offset;
    }

    fn set_scroll_height(&mut self, height: u64) {
        self.scroll_height = height;
    }

    fn unsubscribe(&mut self) {
        self.detached = true;
    }
}
