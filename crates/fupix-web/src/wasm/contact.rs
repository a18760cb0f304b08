#![forbid(unsafe_code)]

//! Contact section: entry animation, character counter and validation.

use std::cell::RefCell;
use std::rc::Rc;

use fupix_site::contact::{
    CharLevel, ContactForm, ContactSubmission, EntryReveal, Field, SectionEntry,
    ValidationResult, escape_html, format_phone_number,
};
use fupix_site::ContactConfig;
use tracing::{debug, info};
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement, HtmlTextAreaElement,
};

use super::dom::{
    by_id, focus, has_intersection_observer, listen, observe_intersections, set_attr, set_class,
    window,
};
use crate::error::WebError;
use crate::options::dom;

/// Current value of an input, select or textarea.
fn field_value(el: &Element) -> String {
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        return area.value();
    }
    js_sys::Reflect::get(el, &"value".into())
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_default()
}

struct ContactDom {
    doc: Document,
    form: ContactForm,
}

impl ContactDom {
    fn submission(&self) -> ContactSubmission {
        let read = |field: Field| {
            self.doc
                .get_element_by_id(field.input_id())
                .map(|el| field_value(&el))
                .unwrap_or_default()
        };
        ContactSubmission {
            name: read(Field::Name),
            email: read(Field::Email),
            subject: read(Field::Subject),
            phone: read(Field::Phone),
            message: read(Field::Message),
        }
    }

    fn show_result(&self, field: Field, result: &ValidationResult) {
        let input = self.doc.get_element_by_id(field.input_id());
        let error = self.doc.get_element_by_id(field.error_id());
        let message = result.error().map(|e| escape_html(&e.format_message()));
        if let Some(input) = &input {
            set_class(input, "error", message.is_some());
            set_attr(input, "aria-invalid", if message.is_some() { "true" } else { "false" });
        }
        if let Some(error) = &error {
            error.set_inner_html(message.as_deref().unwrap_or(""));
            set_class(error, "visible", message.is_some());
        }
    }

    fn validate_field(&self, field: Field) -> bool {
        let submission = self.submission();
        let result = self.form.validate_field(field, submission.value(field));
        self.show_result(field, &result);
        result.is_valid()
    }

    fn update_counter(&self) {
        let Ok(counter) = by_id::<Element>(&self.doc, dom::CHAR_COUNT) else {
            return;
        };
        let message = self
            .doc
            .get_element_by_id(Field::Message.input_id())
            .map(|el| field_value(&el))
            .unwrap_or_default();
        let count = self.form.char_count(&message);
        counter.set_text_content(Some(&count.to_string()));
        for level in [CharLevel::Warning, CharLevel::Danger] {
            if let Some(class) = level.class() {
                set_class(&counter, class, count.level == level);
            }
        }
    }
}

fn reveal_section(section: &Element, reveal: EntryReveal) {
    set_attr(section, "data-section-state", "active");
    set_class(section, "is-visible", true);
    set_class(section, "animate-in", true);
    if reveal == EntryReveal::Immediate {
        set_class(section, "no-animation", true);
    }
}

/// Wire the contact section. Without the section nothing is installed;
/// without the form only the entry animation runs.
pub(crate) fn install_contact(doc: &Document, config: ContactConfig) -> Result<(), WebError> {
    let section: Element = by_id(doc, dom::CONTACT_SECTION)?;
    let win = window()?;

    let reduced_motion = win
        .match_media("(prefers-reduced-motion: reduce)")
        .ok()
        .flatten()
        .is_some_and(|mq| mq.matches());
    let entry = Rc::new(RefCell::new(SectionEntry::new()));
    let initial = entry.borrow_mut().init(reduced_motion);
    if let Some(reveal) = initial {
        reveal_section(&section, reveal);
    } else if has_intersection_observer(&win) {
        let entry = Rc::clone(&entry);
        let target = section.clone();
        observe_intersections(
            &[section.clone()],
            &[0.0, 0.1, 0.2, 0.3],
            Some("-10% 0px -10% 0px"),
            move |entries, observer| {
                for e in entries {
                    let ratio = e.intersection_ratio() as f32;
                    if let Some(reveal) = entry.borrow_mut().observe(e.is_intersecting(), ratio) {
                        reveal_section(&target, reveal);
                        observer.disconnect();
                    }
                }
            },
        )?;
    } else {
        reveal_section(&section, EntryReveal::Immediate);
    }

    let Ok(form_el) = by_id::<HtmlElement>(doc, dom::CONTACT_FORM) else {
        debug!("contact form missing; only the entry animation runs");
        return Ok(());
    };
    let state = Rc::new(ContactDom {
        doc: doc.clone(),
        form: ContactForm::new(config),
    });
    state.update_counter();

    for field in Field::ALL {
        let Some(input) = doc.get_element_by_id(field.input_id()) else {
            continue;
        };
        let target: EventTarget = input.clone().into();
        {
            let state = Rc::clone(&state);
            listen(&target, "blur", true, move |_: Event| {
                state.validate_field(field);
            })?;
        }
        if field == Field::Message {
            let state = Rc::clone(&state);
            listen(&target, "input", true, move |_: Event| state.update_counter())?;
        }
        if field == Field::Phone {
            let input = input.clone();
            listen(&target, "change", true, move |_: Event| {
                if let Some(input) = input.dyn_ref::<HtmlInputElement>() {
                    input.set_value(&format_phone_number(&input.value()));
                }
            })?;
        }
    }

    let target: EventTarget = form_el.clone().into();
    let success = doc.get_element_by_id("successMessage");
    listen(&target, "submit", false, move |ev: Event| {
        ev.prevent_default();
        let submission = state.submission();
        let errors = state.form.validate(&submission);
        for field in Field::ALL {
            let result = errors
                .iter()
                .find(|(f, _)| *f == field)
                .map_or(ValidationResult::Valid, |(_, e)| ValidationResult::Invalid(e.clone()));
            state.show_result(field, &result);
        }
        if errors.is_empty() {
            info!("contact form accepted");
            if let Some(success) = &success {
                set_class(success, "visible", true);
            }
            set_class(&form_el, "submitted", true);
        } else if let Some((field, _)) = errors.first() {
            if let Some(input) = state
                .doc
                .get_element_by_id(field.input_id())
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                focus(&input);
            }
        }
    })?;
    Ok(())
}
