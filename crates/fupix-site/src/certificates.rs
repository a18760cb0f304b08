#![forbid(unsafe_code)]

//! Certificate gallery, detail view and full-size lightbox.
//!
//! The viewer is a modal with two views (gallery grid, single-certificate
//! detail) and an optional lightbox stacked above the detail view.
//!
//! # Invariants
//!
//! - The lightbox is only ever open above an open modal.
//! - Navigation clamps at both ends; it never wraps.
//! - Keys go to the lightbox first when it is open, then to the modal;
//!   with the modal closed they are ignored.
//! - A close request with the lightbox open closes only the lightbox.

use fupix_core::event::{
    HORIZONTAL_SWIPE_THRESHOLD, KeyCode, KeyEvent, Modifiers, SwipeDirection, horizontal_swipe,
};
use serde::Serialize;
use tracing::{debug, warn};

/// One credential shown in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: u32,
    pub title: &'static str,
    pub organization: &'static str,
    pub date: &'static str,
    pub credential_id: &'static str,
    pub description: &'static str,
    pub image: &'static str,
    pub featured: bool,
}

pub const CERTIFICATES: [Certificate; 5] = [
    Certificate {
        id: 1,
        title: "PAGCOR CERTIFICATE OF ACCREDITATION",
        organization: "PAGCOR",
        date: "November 2025",
        credential_id: "GCP-SB-25-036",
        description: "This certification validates expertise in designing distributed systems on AWS. Covers compute, networking, storage, and database AWS services, as well as security best practices and cost optimization strategies.",
        image: "./img/CERTIFICATE.jpg",
        featured: true,
    },
    Certificate {
        id: 2,
        title: "PAGCOR CERTIFICATE OF ENROLLMENT",
        organization: "PAGCOR",
        date: "November 2025",
        credential_id: "COE No. 25-0016",
        description: "Certificate of Enrollment issued by the Philippine Amusement and Gaming Corporation (PAGCOR), confirming the holder's official registration and participation in authorized gaming operations in accordance with existing regulatory policies and guidelines.",
        image: "./img/pagcor-cert-enroll.png",
        featured: false,
    },
    Certificate {
        id: 3,
        title: "MAYOR'S PERMIT FOR BUSINESS OPERATIONS",
        organization: "Quezon City Government",
        date: "January 2025",
        credential_id: "SEC 202403014134112",
        description: "Mayor's Permit issued by Quezon City Hall authorizing the lawful operation of the business, certifying compliance with local ordinances, taxation policies, and regulatory requirements of the Quezon City Government.",
        image: "./img/mayors-permit.png",
        featured: false,
    },
    Certificate {
        id: 4,
        title: "SECURITIES AND EXCHANGE COMMISSION (SEC) CERTIFICATE",
        organization: "SEC PHILIPPINES",
        date: "March 2024",
        credential_id: "COMPANY REG. No. 2024030141341-12",
        description: "Certificate issued by the Securities and Exchange Commission (SEC) confirming the official registration and legal existence of the company in accordance with Philippine corporate laws and regulations.",
        image: "./img/sec.png",
        featured: false,
    },
    Certificate {
        id: 5,
        title: "GLI AUSTRALIA GAME CERTIFICATION",
        organization: "GLI Australia",
        date: "June 2025",
        credential_id: "MO-120-FS7-25-01",
        description: "GLI Australia Game Certification confirming that the gaming system and software have been independently tested and verified to comply with recognized technical standards, fairness requirements, and regulatory specifications for gaming operations.",
        image: "./img/gli.png",
        featured: true,
    },
];

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Which modal view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalView {
    Closed,
    Gallery,
    Detail(usize),
}

/// Where focus should move after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    /// First gallery card (after the opening animation).
    FirstCard,
    /// The detail view's back button.
    BackButton,
    /// The button that opened the modal.
    Opener,
    /// The detail image (lightbox trigger).
    DetailImage,
    /// First focusable element inside the modal.
    FirstFocusable,
    /// Last focusable element inside the modal.
    LastFocusable,
}

/// Side effect for the host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerEffect {
    /// Disable page scrolling under the modal.
    LockBodyScroll,
    /// Restore page scrolling.
    UnlockBodyScroll,
    Focus(FocusTarget),
}

/// Where focus currently sits relative to the modal's focusable elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPosition {
    First,
    Last,
    /// Both first and last (a single focusable element).
    Only,
    Other,
}

/// Whether the host should cancel the key's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Ignored,
}

/// Previous/next button state for a position in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    /// `"n / total"`.
    pub counter: String,
    pub prev_label: String,
    pub next_label: String,
}

/// The certificate modal state machine.
#[derive(Debug, Clone)]
pub struct CertificateViewer {
    certificates: &'static [Certificate],
    view: ModalView,
    lightbox: Option<usize>,
    effects: Vec<ViewerEffect>,
}

impl Default for CertificateViewer {
    fn default() -> Self {
        Self::new(&CERTIFICATES)
    }
}

impl CertificateViewer {
    #[must_use]
    pub fn new(certificates: &'static [Certificate]) -> Self {
        Self {
            certificates,
            view: ModalView::Closed,
            lightbox: None,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn certificates(&self) -> &'static [Certificate] {
        self.certificates
    }

    #[must_use]
    pub fn view(&self) -> ModalView {
        self.view
    }

    #[must_use]
    pub fn lightbox(&self) -> Option<usize> {
        self.lightbox
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.view != ModalView::Closed
    }

    /// The certificate in the detail view, if any.
    #[must_use]
    pub fn current(&self) -> Option<&'static Certificate> {
        match self.view {
            ModalView::Detail(i) => self.certificates.get(i),
            _ => None,
        }
    }

    /// Drain queued effects in order.
    pub fn drain_effects(&mut self) -> Vec<ViewerEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Button state for position `index`.
    #[must_use]
    pub fn nav_state(&self, index: usize) -> NavState {
        let total = self.certificates.len();
        let prev = index.checked_sub(1).and_then(|i| self.certificates.get(i));
        let next = self.certificates.get(index + 1);
        NavState {
            prev_enabled: prev.is_some(),
            next_enabled: next.is_some(),
            counter: format!("{} / {total}", index + 1),
            prev_label: prev.map_or_else(
                || "No previous certificate".to_string(),
                |c| format!("Previous: {}", c.title),
            ),
            next_label: next.map_or_else(
                || "No next certificate".to_string(),
                |c| format!("Next: {}", c.title),
            ),
        }
    }

    // -----------------------------------------------------------------------
    // Modal
    // -----------------------------------------------------------------------

    pub fn open(&mut self) {
        self.view = ModalView::Gallery;
        self.effects.push(ViewerEffect::LockBodyScroll);
        self.effects.push(ViewerEffect::Focus(FocusTarget::FirstCard));
        debug!("certificate modal opened");
    }

    /// Close request (close button, backdrop, Escape in the gallery).
    pub fn close(&mut self) {
        if self.lightbox.is_some() {
            self.close_lightbox();
            return;
        }
        if self.view == ModalView::Closed {
            return;
        }
        self.view = ModalView::Closed;
        self.effects.push(ViewerEffect::UnlockBodyScroll);
        self.effects.push(ViewerEffect::Focus(FocusTarget::Opener));
        debug!("certificate modal closed");
    }

    pub fn show_gallery(&mut self) {
        if self.is_open() {
            self.view = ModalView::Gallery;
        }
    }

    /// Show certificate `index`. Out-of-range indices are ignored.
    pub fn show_detail(&mut self, index: usize) -> bool {
        if !self.is_open() {
            return false;
        }
        if index >= self.certificates.len() {
            warn!(index, "invalid certificate index");
            return false;
        }
        self.view = ModalView::Detail(index);
        self.effects.push(ViewerEffect::Focus(FocusTarget::BackButton));
        true
    }

    pub fn show_previous(&mut self) -> bool {
        match self.view {
            ModalView::Detail(i) if i > 0 => self.show_detail(i - 1),
            _ => false,
        }
    }

    pub fn show_next(&mut self) -> bool {
        match self.view {
            ModalView::Detail(i) => self.show_detail(i + 1),
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Lightbox
    // -----------------------------------------------------------------------

    /// Open the lightbox at `index`, or at the detail certificate.
    pub fn open_lightbox(&mut self, index: Option<usize>) -> bool {
        let target = match (index, self.view) {
            (Some(i), ModalView::Detail(_)) => i,
            (None, ModalView::Detail(i)) => i,
            _ => return false,
        };
        if target >= self.certificates.len() {
            return false;
        }
        self.lightbox = Some(target);
        true
    }

    pub fn close_lightbox(&mut self) {
        if self.lightbox.take().is_some() {
            self.effects.push(ViewerEffect::Focus(FocusTarget::DetailImage));
        }
    }

    pub fn lightbox_previous(&mut self) -> bool {
        match self.lightbox {
            Some(i) if i > 0 => {
                self.lightbox = Some(i - 1);
                true
            }
            _ => false,
        }
    }

    pub fn lightbox_next(&mut self) -> bool {
        match self.lightbox {
            Some(i) if i + 1 < self.certificates.len() => {
                self.lightbox = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Document-level keydown routing.
    pub fn handle_key(&mut self, key: &KeyEvent, focus: FocusPosition) -> KeyOutcome {
        if self.lightbox.is_some() {
            match key.code {
                KeyCode::Escape => self.close_lightbox(),
                KeyCode::Left => {
                    self.lightbox_previous();
                }
                KeyCode::Right => {
                    self.lightbox_next();
                }
                _ => return KeyOutcome::Ignored,
            }
            return KeyOutcome::Handled;
        }
        if !self.is_open() {
            return KeyOutcome::Ignored;
        }
        let in_detail = matches!(self.view, ModalView::Detail(_));
        match key.code {
            KeyCode::Escape => {
                if in_detail {
                    self.show_gallery();
                } else {
                    self.close();
                }
                KeyOutcome::Handled
            }
            KeyCode::Left if in_detail => {
                self.show_previous();
                KeyOutcome::Handled
            }
            KeyCode::Right if in_detail => {
                self.show_next();
                KeyOutcome::Handled
            }
            KeyCode::Tab => self.trap_focus(key.modifiers.contains(Modifiers::SHIFT), focus),
            _ => KeyOutcome::Ignored,
        }
    }

    fn trap_focus(&mut self, backwards: bool, focus: FocusPosition) -> KeyOutcome {
        let wrap_to = match (backwards, focus) {
            (true, FocusPosition::First | FocusPosition::Only) => FocusTarget::LastFocusable,
            (false, FocusPosition::Last | FocusPosition::Only) => FocusTarget::FirstFocusable,
            _ => return KeyOutcome::Ignored,
        };
        self.effects.push(ViewerEffect::Focus(wrap_to));
        KeyOutcome::Handled
    }

    /// A completed horizontal swipe over the detail view or the lightbox.
    pub fn handle_swipe(&mut self, start_x: f32, end_x: f32, in_lightbox: bool) -> bool {
        let Some(direction) = horizontal_swipe(start_x, end_x, HORIZONTAL_SWIPE_THRESHOLD) else {
            return false;
        };
        match (in_lightbox, direction) {
            (true, SwipeDirection::Left) => self.lightbox_next(),
            (true, SwipeDirection::Right) => self.lightbox_previous(),
            (false, SwipeDirection::Left) => self.show_next(),
            (false, SwipeDirection::Right) => self.show_previous(),
        }
    }
}
