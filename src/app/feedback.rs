use std::time::Duration;

use leptos::prelude::*;

const TOAST_LIFETIME: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub text: String,
    id: u64,
}

/// A single transient notification slot. A newer toast replaces the
/// current one; each toast removes only itself when it expires.
#[derive(Debug, Clone, Copy)]
pub struct Toaster {
    current: RwSignal<Option<Toast>>,
    next_id: StoredValue<u64>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
            next_id: StoredValue::new(0),
        }
    }

    pub fn show(&self, kind: ToastKind, text: impl Into<String>) {
        let id = self.next_id.try_update_value(|n| {
            *n += 1;
            *n
        });
        let Some(id) = id else {
            return;
        };
        self.current.set(Some(Toast {
            kind,
            text: text.into(),
            id,
        }));
        let current = self.current;
        set_timeout(
            move || {
                if current.get_untracked().is_some_and(|t| t.id == id) {
                    current.set(None);
                }
            },
            TOAST_LIFETIME,
        );
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(ToastKind::Success, text);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(ToastKind::Error, text);
    }
}

#[component]
pub fn ToastView(toaster: Toaster) -> impl IntoView {
    move || {
        toaster.current.get().map(|toast| {
            let class = match toast.kind {
                ToastKind::Success => "border-green/40 text-green",
                ToastKind::Error => "border-red/40 text-red",
            };
            view! {
                <div
                    role="status"
                    class=format!(
                        "fixed top-4 right-4 z-50 px-4 py-3 rounded-md border bg-background shadow-lg {class}",
                    )
                >
                    {toast.text}
                </div>
            }
        })
    }
}

#[component]
pub fn ThankYouModal(open: RwSignal<bool>) -> impl IntoView {
    move || {
        open.get()
            .then(|| {
                view! {
                    <div class="fixed inset-0 z-50 bg-black/70 flex items-center justify-center px-4">
                        <div
                            role="dialog"
                            aria-modal="true"
                            class="bg-background border border-green/30 rounded-lg p-8 max-w-sm w-full text-center"
                        >
                            <h3 class="text-xl font-bold text-green">"Thank You!"</h3>
                            <p class="text-sm text-muted mt-2">
                                "Your message has been sent successfully. I'll get back to you soon."
                            </p>
                            <button
                                class="mt-6 px-6 py-2 bg-green/20 hover:bg-green/30 text-green rounded-md border border-green/30"
                                on:click=move |_| open.set(false)
                            >
                                "Close"
                            </button>
                        </div>
                    </div>
                }
            })
    }
}
