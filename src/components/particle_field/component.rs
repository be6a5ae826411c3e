//! Leptos components wrapping the particle field canvas and theme picker.
//!
//! The canvas component sizes itself to the viewport, registers window
//! `resize`, `mousemove` and `mouseout` listeners, subscribes to the theme store and runs an
//! animation loop via `requestAnimationFrame`. Unmounting cancels the pending
//! frame and removes every listener and subscription in one step.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, info};
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::particles::ParticleField;
use super::render;
use super::store::{SubscriptionId, ThemeStore};
use super::style::VisualStyle;
use super::theme::Theme;

/// Reasons the background could not start.
#[derive(Debug, thiserror::Error)]
pub enum FieldError {
	/// Not running in a browser window, or the viewport size is unreadable.
	#[error("no global window")]
	NoWindow,
	/// The window has no document.
	#[error("no document")]
	NoDocument,
	/// The canvas refused a 2D context.
	#[error("2d drawing context unavailable")]
	ContextUnavailable,
	/// A browser API call threw.
	#[error("browser call failed: {0}")]
	Js(String),
}

impl From<JsValue> for FieldError {
	fn from(value: JsValue) -> Self {
		FieldError::Js(format!("{value:?}"))
	}
}

/// Engine state shared between the frame loop and event callbacks.
struct FieldContext {
	field: ParticleField,
	ctx: CanvasRenderingContext2d,
}

/// Everything that must be released on unmount.
#[derive(Default)]
struct Mounted {
	window: Option<Window>,
	animate: Option<Closure<dyn FnMut()>>,
	resize: Option<Closure<dyn FnMut()>>,
	pointer: Option<Closure<dyn FnMut(MouseEvent)>>,
	leave: Option<Closure<dyn FnMut(MouseEvent)>>,
	subscription: Option<SubscriptionId>,
}

fn viewport_size(window: &Window) -> Result<(f64, f64), FieldError> {
	let w = window.inner_width()?.as_f64().ok_or(FieldError::NoWindow)?;
	let h = window.inner_height()?.as_f64().ok_or(FieldError::NoWindow)?;
	Ok((w, h))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, FieldError> {
	canvas
		.get_context("2d")?
		.ok_or(FieldError::ContextUnavailable)?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| FieldError::ContextUnavailable)
}

/// Acquire the surface, seed the field, register listeners and start the loop.
fn start(
	canvas: HtmlCanvasElement,
	style: VisualStyle,
	store: &ThemeStore,
	mounted: &Rc<RefCell<Mounted>>,
	frame_id: &Rc<Cell<Option<i32>>>,
) -> Result<(), FieldError> {
	let window = web_sys::window().ok_or(FieldError::NoWindow)?;
	window.document().ok_or(FieldError::NoDocument)?;

	let (w, h) = viewport_size(&window)?;
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	let ctx = context_2d(&canvas)?;

	let count = style.particle_count;
	let context = Rc::new(RefCell::new(FieldContext {
		field: ParticleField::new(style, store.current(), w, h),
		ctx,
	}));

	let context_theme = context.clone();
	let subscription = store.subscribe(move |theme: Theme| {
		if let Ok(mut c) = context_theme.try_borrow_mut() {
			c.field.set_theme(theme);
		}
	});

	let (context_resize, canvas_resize) = (context.clone(), canvas.clone());
	let resize = Closure::<dyn FnMut()>::new(move || {
		let Some(win) = web_sys::window() else {
			return;
		};
		let Ok((nw, nh)) = viewport_size(&win) else {
			return;
		};
		canvas_resize.set_width(nw as u32);
		canvas_resize.set_height(nh as u32);
		if let Ok(mut c) = context_resize.try_borrow_mut() {
			c.field.resize(nw, nh);
		}
	});

	let context_pointer = context.clone();
	let pointer = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
		if let Ok(mut c) = context_pointer.try_borrow_mut() {
			c.field.set_pointer(ev.client_x() as f64, ev.client_y() as f64);
		}
	});

	// `mouseout` with no related target means the pointer left the page.
	let context_leave = context.clone();
	let leave = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
		if ev.related_target().is_some() {
			return;
		}
		if let Ok(mut c) = context_leave.try_borrow_mut() {
			c.field.clear_pointer();
		}
	});

	let (context_anim, mounted_anim, frame_anim) =
		(context.clone(), mounted.clone(), frame_id.clone());
	let animate = Closure::<dyn FnMut()>::new(move || {
		if let Ok(mut c) = context_anim.try_borrow_mut() {
			c.field.step();
			render::render(&c.field, &c.ctx);
		}
		let next = mounted_anim.borrow().animate.as_ref().and_then(|cb| {
			web_sys::window()?
				.request_animation_frame(cb.as_ref().unchecked_ref())
				.ok()
		});
		frame_anim.set(next);
	});

	// Record everything before registering so a partial setup is still torn down.
	*mounted.borrow_mut() = Mounted {
		window: Some(window.clone()),
		animate: Some(animate),
		resize: Some(resize),
		pointer: Some(pointer),
		leave: Some(leave),
		subscription: Some(subscription),
	};

	let m = mounted.borrow();
	if let Some(ref cb) = m.resize {
		window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())?;
	}
	if let Some(ref cb) = m.pointer {
		window.add_event_listener_with_callback("mousemove", cb.as_ref().unchecked_ref())?;
	}
	if let Some(ref cb) = m.leave {
		window.add_event_listener_with_callback("mouseout", cb.as_ref().unchecked_ref())?;
	}
	if let Some(ref cb) = m.animate {
		frame_id.set(Some(
			window.request_animation_frame(cb.as_ref().unchecked_ref())?,
		));
	}

	info!(
		"portfolio-field: running with {} particles at {}x{}",
		count, w, h
	);
	Ok(())
}

/// Cancel the pending frame, detach listeners and drop the closures.
fn teardown(store: &ThemeStore, mounted: &RefCell<Mounted>, frame_id: &Cell<Option<i32>>) {
	let m = std::mem::take(&mut *mounted.borrow_mut());
	if let Some(ref window) = m.window {
		if let Some(id) = frame_id.take() {
			if let Err(e) = window.cancel_animation_frame(id) {
				error!("portfolio-field: failed to cancel frame: {:?}", e);
			}
		}
		if let Some(ref cb) = m.resize {
			if let Err(e) =
				window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
			{
				error!("portfolio-field: failed to remove resize listener: {:?}", e);
			}
		}
		if let Some(ref cb) = m.pointer {
			if let Err(e) = window
				.remove_event_listener_with_callback("mousemove", cb.as_ref().unchecked_ref())
			{
				error!("portfolio-field: failed to remove pointer listener: {:?}", e);
			}
		}
		if let Some(ref cb) = m.leave {
			if let Err(e) = window
				.remove_event_listener_with_callback("mouseout", cb.as_ref().unchecked_ref())
			{
				error!("portfolio-field: failed to remove pointer-leave listener: {:?}", e);
			}
		}
	}
	if let Some(id) = m.subscription {
		store.unsubscribe(id);
	}
	debug!(
		"portfolio-field: torn down, {} theme subscribers remain",
		store.subscriber_count()
	);
}

/// Full-viewport animated particle background.
///
/// Reads its palette from `store` and follows theme changes for as long as it
/// is mounted. If the canvas or its 2D context cannot be acquired the
/// component stays blank and logs the reason.
#[component]
pub fn ParticleFieldCanvas(
	/// Theme source; the canvas follows every change.
	store: ThemeStore,
	/// Background variant to run.
	#[prop(default = VisualStyle::default())]
	style: VisualStyle,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let mounted: Rc<RefCell<Mounted>> = Rc::new(RefCell::new(Mounted::default()));
	let frame_id: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
	let started = Rc::new(Cell::new(false));

	let (store_init, mounted_init, frame_init) = (store.clone(), mounted.clone(), frame_id.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if started.replace(true) {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		if let Err(e) = start(canvas, style.clone(), &store_init, &mounted_init, &frame_init) {
			error!("portfolio-field: background disabled: {}", e);
		}
	});

	let cleanup = SendWrapper::new(move || teardown(&store, &mounted, &frame_id));
	on_cleanup(move || (cleanup.take())());

	view! {
		<canvas
			node_ref=canvas_ref
			class="particle-field-canvas"
			style="position: fixed; inset: 0; z-index: -40; opacity: 0.6; pointer-events: none;"
		/>
	}
}

/// Dropdown listing every theme; selecting one updates the store.
#[component]
pub fn ThemeToggle(
	/// Store the menu reads and writes.
	store: ThemeStore,
) -> impl IntoView {
	let current = RwSignal::new(store.current());
	let open = RwSignal::new(false);

	let subscription = store.subscribe(move |theme| current.set(theme));
	let store_cleanup = SendWrapper::new(store.clone());
	on_cleanup(move || {
		store_cleanup.unsubscribe(subscription);
	});

	let options = Theme::ALL
		.into_iter()
		.map(|theme| {
			let store = store.clone();
			view! {
				<button
					class="theme-option"
					class:active=move || current.get() == theme
					on:click=move |_| {
						store.select(theme);
						open.set(false);
					}
				>
					<span class="theme-name">{theme.name()}</span>
					<span class="theme-description">{theme.description()}</span>
				</button>
			}
		})
		.collect_view();

	view! {
		<div class="theme-toggle">
			<button class="theme-toggle-button" on:click=move |_| open.update(|o| *o = !*o)>
				{move || current.get().name()}
			</button>
			<Show when=move || open.get()>
				<div class="theme-backdrop" on:click=move |_| open.set(false) />
			</Show>
			<div class="theme-menu" class:hidden=move || !open.get()>
				{options}
			</div>
		</div>
	}
}
