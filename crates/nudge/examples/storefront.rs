//! Minimal host wiring: a fake "page" implementing [`Surface`], a popup
//! configured for a zero delay, and a hand-rolled pump showing the
//! open / dismiss / persist cycle.
//!
//! Run with `cargo run --example storefront`.

use nudge::{
    CloseReason, NodeId, Popup, PopupHandles, ScrollLock, ScrollMetrics, Signal, Surface,
};

const OVERLAY: NodeId = 1;
const DIALOG: NodeId = 2;
const CLOSE: NodeId = 3;
const CTA: NodeId = 4;
const NO_THANKS: NodeId = 5;

/// A toy page: one focused element, a fixed focusable set, scroll state
/// tracked as plain fields.
struct DemoPage {
    focused: Option<NodeId>,
    popup_visible: bool,
    scroll_suppressed: bool,
    next_lock: u64,
}

impl DemoPage {
    fn new() -> Self {
        Self {
            focused: Some(42),
            popup_visible: false,
            scroll_suppressed: false,
            next_lock: 0,
        }
    }
}

impl Surface for DemoPage {
    fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    fn set_focus(&mut self, node: NodeId) -> bool {
        self.focused = Some(node);
        true
    }

    fn focusable_descendants(&self, _root: NodeId) -> Vec<NodeId> {
        vec![CLOSE, CTA, NO_THANKS]
    }

    fn scroll_metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(0.0, 2400.0, 900.0)
    }

    fn lock_scroll(&mut self) -> ScrollLock {
        self.scroll_suppressed = true;
        self.next_lock += 1;
        ScrollLock::new(self.next_lock)
    }

    fn unlock_scroll(&mut self, _lock: ScrollLock) {
        self.scroll_suppressed = false;
    }

    fn set_open(&mut self, open: bool) {
        self.popup_visible = open;
    }
}

fn main() {
    let handles = PopupHandles::from_parts(
        Some(OVERLAY),
        Some(DIALOG),
        Some(CLOSE),
        Some(CTA),
        Some(NO_THANKS),
    )
    .expect("all five handles are wired");

    let mut page = DemoPage::new();
    let mut popup = Popup::builder(handles)
        .config_json(Some(r#"{"trigger":"delay","delayMs":0,"dismissHours":2}"#))
        .instance_id("storefront-demo")
        .attach();

    println!("attached, interest = {:?}", popup.interest());

    // The host's timer pump delivers a tick; the zero delay fires.
    popup.handle_signal(&Signal::Tick, &mut page);
    println!(
        "after tick: open={}, visible={}, focus={:?}, scroll locked={}",
        popup.is_open(),
        page.popup_visible,
        page.focused,
        page.scroll_suppressed
    );

    // The user clicks "no thanks".
    popup.close(CloseReason::Secondary, &mut page);
    println!(
        "after dismiss: open={}, visible={}, focus restored to {:?}, dismissed={}",
        popup.is_open(),
        page.popup_visible,
        page.focused,
        popup.is_dismissed()
    );

    popup.detach(&mut page);
    println!("after detach: interest = {:?}", popup.interest());
}
