use std::time::Duration;

use leptos::{ev, html, prelude::*, task::spawn_local};
use leptos_meta::Script;

#[cfg(feature = "hydrate")]
use codee::string::JsonSerdeWasmCodec;
#[cfg(feature = "hydrate")]
use leptos_use::storage::use_session_storage;

#[cfg(feature = "hydrate")]
use crate::contact::DRAFT_STORAGE_KEY;
use crate::contact::{
    BlockReason, ContactSettings, Dispatch, Field, FormPayload, Outcome, Shortcut, Subject,
    SubmissionGate, SubmissionResult, SubmitAttempt, HONEYPOT_FIELD,
};

use super::feedback::{ThankYouModal, ToastView, Toaster};

const TURNSTILE_SCRIPT: &str = "https://challenges.cloudflare.com/turnstile/v0/api.js";
const THANK_YOU_DELAY: Duration = Duration::from_millis(600);

#[server]
pub async fn send_mail(payload: FormPayload) -> Result<SubmissionResult, ServerFnError> {
    use std::sync::Arc;

    use crate::mail::SmtpDispatcher;

    let Some(dispatcher) = use_context::<Arc<SmtpDispatcher>>() else {
        tracing::error!("Mail dispatcher missing from server context");
        return Ok(SubmissionResult::failed());
    };
    tracing::info!(subject = %payload.subject, "Contact form submission received");
    Ok(dispatcher.send(&payload).await)
}

#[server(input = leptos::server_fn::codec::GetUrl)]
pub async fn contact_settings() -> Result<ContactSettings, ServerFnError> {
    Ok(use_context::<ContactSettings>().unwrap_or_default())
}

/// Dispatches through the `send_mail` server function. A failed call counts
/// as a failed send.
struct ServerDispatch;

impl Dispatch for ServerDispatch {
    async fn dispatch(&self, payload: FormPayload) -> SubmissionResult {
        send_mail(payload).await.unwrap_or_else(|e| {
            log::error!("send_mail failed: {e}");
            SubmissionResult::failed()
        })
    }
}

#[derive(Clone, Copy)]
struct FieldRefs {
    first_name: NodeRef<html::Input>,
    last_name: NodeRef<html::Input>,
    email: NodeRef<html::Input>,
    phone: NodeRef<html::Input>,
    message: NodeRef<html::Textarea>,
    challenge: NodeRef<html::Input>,
    verification: NodeRef<html::Div>,
}

impl FieldRefs {
    fn new() -> Self {
        Self {
            first_name: NodeRef::new(),
            last_name: NodeRef::new(),
            email: NodeRef::new(),
            phone: NodeRef::new(),
            message: NodeRef::new(),
            challenge: NodeRef::new(),
            verification: NodeRef::new(),
        }
    }

    fn focus(&self, field: Field) {
        let res = match field {
            Field::FirstName => self.first_name.get_untracked().map(|el| el.focus()),
            Field::LastName => self.last_name.get_untracked().map(|el| el.focus()),
            Field::Email => self.email.get_untracked().map(|el| el.focus()),
            Field::Phone => self.phone.get_untracked().map(|el| el.focus()),
            Field::Message => self.message.get_untracked().map(|el| el.focus()),
            Field::Challenge => self.challenge.get_untracked().map(|el| el.focus()),
            Field::Verification => self.verification.get_untracked().map(|el| el.focus()),
            Field::Subject => None,
        };
        if let Some(Err(e)) = res {
            log::warn!("Couldn't focus {}: {e:?}", field.name());
        }
    }
}

#[component]
pub fn ContactSection() -> impl IntoView {
    let gate = StoredValue::new(SubmissionGate::new(false));
    // bumped whenever the gate changes so views re-read it
    let changed = Trigger::new();
    let refs = FieldRefs::new();
    let form_ref = NodeRef::<html::Form>::new();
    let answer = RwSignal::new(String::new());
    let toaster = Toaster::new();
    let show_thanks = RwSignal::new(false);

    let settings = Resource::new(|| (), |_| contact_settings());

    #[cfg(feature = "hydrate")]
    let (draft, set_draft, _) = use_session_storage::<FormPayload, JsonSerdeWasmCodec>(
        DRAFT_STORAGE_KEY,
    );

    // the browser is the only place with entropy, so the real challenge
    // replaces the placeholder here
    Effect::new(move |_| {
        gate.update_value(|g| g.initialize());
        #[cfg(feature = "hydrate")]
        {
            let draft = draft.get_untracked();
            if !draft.is_empty() {
                gate.update_value(|g| g.restore(&draft));
            }
        }
        changed.notify();
    });

    Effect::new(move |_| {
        if let Some(Ok(settings)) = settings.get() {
            let enabled = settings.verification_site_key.is_some();
            gate.update_value(|g| g.set_verification_enabled(enabled));
            changed.notify();
        }
    });

    let save_draft = move || {
        #[cfg(feature = "hydrate")]
        set_draft.set(gate.with_value(|g| g.payload().clone()));
    };

    let update = move |field: Field, value: String| {
        gate.update_value(|g| g.update_field(field, &value));
        changed.notify();
        save_draft();
    };

    let handle_outcome = move |outcome: Outcome| match outcome {
        Outcome::Busy | Outcome::Discarded => {}
        Outcome::Blocked(reason) => {
            toaster.error(reason.notice());
            refs.focus(reason.field());
            if reason == BlockReason::WrongAnswer {
                answer.set(String::new());
            }
        }
        Outcome::Sent => {
            toaster.success("Message sent successfully 🚀");
            answer.set(String::new());
            save_draft();
            set_timeout(move || show_thanks.set(true), THANK_YOU_DELAY);
        }
        Outcome::Failed => {
            toaster.error("Failed to send message ❌");
        }
    };

    let run = move |prepared: Option<Result<FormPayload, Outcome>>| {
        changed.notify();
        match prepared {
            Some(Ok(payload)) => spawn_local(async move {
                let result = ServerDispatch.dispatch(payload).await;
                if let Some(outcome) = gate.try_update_value(|g| g.complete(result)) {
                    changed.notify();
                    handle_outcome(outcome);
                }
            }),
            Some(Err(outcome)) => handle_outcome(outcome),
            None => {}
        }
    };

    let read_attempt = move || {
        let form_value = |name: &str| {
            form_ref
                .get_untracked()
                .and_then(|form| leptos::web_sys::FormData::new_with_form(&form).ok())
                .and_then(|data| data.get(name).as_string())
                .unwrap_or_default()
        };
        let token = form_value(Field::Verification.name());
        SubmitAttempt {
            honeypot: form_value(HONEYPOT_FIELD),
            answer: answer.get_untracked(),
            verification_token: (!token.is_empty()).then_some(token),
        }
    };

    let submit = move || {
        let attempt = read_attempt();
        run(gate.try_update_value(|g| g.prepare(&attempt)));
    };

    let retry = move |_: ev::MouseEvent| {
        run(gate.try_update_value(|g| g.prepare_retry()).flatten());
    };

    let clear = move |_: ev::MouseEvent| {
        gate.update_value(|g| g.reset());
        answer.set(String::new());
        changed.notify();
        save_draft();
    };

    let keys = window_event_listener(ev::keydown, move |ev| {
        match Shortcut::from_key(&ev.key(), ev.alt_key(), ev.ctrl_key()) {
            Some(Shortcut::Focus(field)) => {
                ev.prevent_default();
                refs.focus(field);
            }
            Some(Shortcut::Submit) => {
                ev.prevent_default();
                // goes through the form so the browser's `required` checks run
                if !gate.with_value(|g| g.is_sending()) {
                    if let Some(form) = form_ref.get_untracked() {
                        if let Err(e) = form.request_submit() {
                            log::warn!("Couldn't submit contact form: {e:?}");
                        }
                    }
                }
            }
            None => {}
        }
    });
    on_cleanup(move || keys.remove());

    let sending = move || {
        changed.track();
        gate.with_value(|g| g.is_sending())
    };
    let can_retry = move || {
        changed.track();
        gate.with_value(|g| g.can_retry())
    };
    let needs_verification = move || {
        changed.track();
        gate.with_value(|g| g.requires_verification())
    };
    let question = move || {
        changed.track();
        gate.with_value(|g| g.challenge().to_string())
    };
    let subject = move || {
        changed.track();
        gate.with_value(|g| g.payload().subject)
    };

    view! {
        <section id="contact" class="w-full max-w-3xl mx-auto my-16 px-4 section-content">
            <ToastView toaster />
            <ThankYouModal open=show_thanks />
            <div class="text-center mb-8">
                <h2 class="text-3xl font-bold">"Contact"</h2>
                <p class="text-muted mt-2">"Let's connect, send me a message"</p>
            </div>
            <form
                node_ref=form_ref
                class="space-y-6 p-6 rounded-lg border border-muted/30 bg-brightBlack/20"
                on:submit=move |ev| {
                    ev.prevent_default();
                    submit();
                }
            >
                // hidden from people, filled in by bots
                <input
                    type="text"
                    name=HONEYPOT_FIELD
                    tabindex="-1"
                    autocomplete="off"
                    aria-hidden="true"
                    class="hidden"
                />
                <div class="grid sm:grid-cols-2 gap-4">
                    <FieldInput
                        field=Field::FirstName
                        label="First Name"
                        node_ref=refs.first_name
                        gate
                        changed
                        on_update=update
                    />
                    <FieldInput
                        field=Field::LastName
                        label="Last Name"
                        node_ref=refs.last_name
                        gate
                        changed
                        on_update=update
                    />
                </div>
                <FieldInput
                    field=Field::Email
                    label="Email"
                    input_type="email"
                    node_ref=refs.email
                    gate
                    changed
                    on_update=update
                />
                <FieldInput
                    field=Field::Phone
                    label="Phone Number"
                    input_type="tel"
                    node_ref=refs.phone
                    gate
                    changed
                    on_update=update
                />
                <select
                    name=Field::Subject.name()
                    required
                    class="w-full px-4 py-3 rounded-md border border-muted bg-background text-foreground"
                    on:change=move |ev| update(Field::Subject, event_target_value(&ev))
                >
                    {Subject::ALL
                        .into_iter()
                        .map(|s| {
                            view! {
                                <option value=s.label() selected=move || subject() == s>
                                    {s.label()}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                <div class="relative">
                    <textarea
                        node_ref=refs.message
                        name=Field::Message.name()
                        rows="5"
                        required
                        placeholder="Message"
                        class="w-full px-4 py-3 rounded-md border border-muted bg-background text-foreground"
                        prop:value=move || {
                            changed.track();
                            gate.with_value(|g| g.payload().message.clone())
                        }
                        on:input=move |ev| update(Field::Message, event_target_value(&ev))
                    ></textarea>
                    <span class="absolute right-4 top-3 text-xs text-muted">
                        {Shortcut::hint(Field::Message)}
                    </span>
                    <FieldError field=Field::Message gate changed />
                </div>
                <div class="flex flex-wrap items-center gap-3">
                    <label for="contact_challenge" class="font-medium text-cyan">
                        {question}
                    </label>
                    <input
                        id="contact_challenge"
                        node_ref=refs.challenge
                        name=Field::Challenge.name()
                        inputmode="numeric"
                        autocomplete="off"
                        required
                        class="w-24 px-3 py-2 rounded-md border border-muted bg-background text-foreground"
                        prop:value=answer
                        on:input=move |ev| answer.set(event_target_value(&ev))
                    />
                    <button
                        type="button"
                        class="text-sm text-muted hover:text-foreground disabled:opacity-40"
                        aria-label="New question"
                        disabled=can_retry
                        on:click=move |_| {
                            gate.update_value(|g| g.refresh_challenge());
                            answer.set(String::new());
                            changed.notify();
                        }
                    >
                        "↻"
                    </button>
                    <FieldError field=Field::Challenge gate changed />
                </div>
                {move || {
                    let site_key = settings
                        .get()
                        .and_then(|s| s.ok())
                        .and_then(|s| s.verification_site_key);
                    match (needs_verification(), site_key) {
                        (true, Some(site_key)) => {
                            Some(
                                view! {
                                    <div>
                                        <div
                                            node_ref=refs.verification
                                            tabindex="-1"
                                            class="cf-turnstile"
                                            data-sitekey=site_key
                                            data-response-field-name=Field::Verification.name()
                                        ></div>
                                        <Script src=TURNSTILE_SCRIPT async_="true" defer="true" />
                                        <FieldError field=Field::Verification gate changed />
                                    </div>
                                },
                            )
                        }
                        _ => None,
                    }
                }}
                <div class="flex gap-3">
                    <button
                        type="submit"
                        disabled=sending
                        class="flex-1 flex items-center justify-center gap-3 bg-green/20 hover:bg-green/30 text-green py-3 rounded-md border border-green/30 disabled:opacity-60"
                    >
                        {move || if sending() { "Sending..." } else { "Send Message" }}
                        <span class="text-xs opacity-70">"(Ctrl + Enter)"</span>
                    </button>
                    <button
                        type="button"
                        disabled=sending
                        class="px-6 py-3 rounded-md border border-muted text-muted hover:text-foreground disabled:opacity-60"
                        on:click=clear
                    >
                        "Clear"
                    </button>
                </div>
                {move || {
                    can_retry()
                        .then(|| {
                            view! {
                                <div class="flex items-center justify-between p-3 rounded-md border border-red/30 text-red">
                                    <span>"Your message couldn't be sent. Your input is still here."</span>
                                    <button
                                        type="button"
                                        class="px-4 py-1 rounded-md border border-red/40 hover:bg-red/20"
                                        on:click=retry
                                    >
                                        "Retry"
                                    </button>
                                </div>
                            }
                        })
                }}
            </form>
        </section>
    }
}

#[component]
fn FieldInput(
    field: Field,
    label: &'static str,
    #[prop(default = "text")] input_type: &'static str,
    node_ref: NodeRef<html::Input>,
    gate: StoredValue<SubmissionGate>,
    changed: Trigger,
    on_update: impl Fn(Field, String) + Copy + Send + Sync + 'static,
) -> impl IntoView {
    view! {
        <div>
            <div class="relative">
                <input
                    node_ref=node_ref
                    type=input_type
                    name=field.name()
                    placeholder=label
                    aria-label=label
                    required
                    class="w-full px-4 py-3 pr-20 rounded-md border border-muted bg-background text-foreground focus:outline-none focus:ring-2 focus:ring-cyan"
                    prop:value=move || {
                        changed.track();
                        gate.with_value(|g| g.payload().get(field).unwrap_or_default().to_string())
                    }
                    on:input=move |ev| on_update(field, event_target_value(&ev))
                />
                <span class="absolute right-4 top-1/2 -translate-y-1/2 text-xs text-muted">
                    {Shortcut::hint(field)}
                </span>
            </div>
            <FieldError field gate changed />
        </div>
    }
}

#[component]
fn FieldError(field: Field, gate: StoredValue<SubmissionGate>, changed: Trigger) -> impl IntoView {
    move || {
        changed.track();
        gate.with_value(|g| g.error())
            .filter(|e| e.field() == field)
            .map(|e| view! { <p class="mt-1 text-sm text-red">{e.to_string()}</p> })
    }
}
