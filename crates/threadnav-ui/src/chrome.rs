use threadnav_core::RenderError;

/// Panel-level presentation flags.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PanelState {
    pub collapsed: bool,
    pub hidden: bool,
    pub debug: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            collapsed: true,
            hidden: false,
            debug: false,
        }
    }
}

/// Panel chrome driven by user input rather than by reconciliation.
pub trait PanelChrome {
    fn set_collapsed(&mut self, collapsed: bool) -> Result<(), RenderError>;

    fn set_hidden(&mut self, hidden: bool) -> Result<(), RenderError>;

    fn set_debug(&mut self, debug: bool) -> Result<(), RenderError>;

    fn panel_state(&self) -> PanelState;
}

impl<T: PanelChrome + ?Sized> PanelChrome for &mut T {
    fn set_collapsed(&mut self, collapsed: bool) -> Result<(), RenderError> {
        (**self).set_collapsed(collapsed)
    }

    fn set_hidden(&mut self, hidden: bool) -> Result<(), RenderError> {
        (**self).set_hidden(hidden)
    }

    fn set_debug(&mut self, debug: bool) -> Result<(), RenderError> {
        (**self).set_debug(debug)
    }

    fn panel_state(&self) -> PanelState {
        (**self).panel_state()
    }
}
