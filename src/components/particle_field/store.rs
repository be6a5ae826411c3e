//! Process-wide theme selection.
//!
//! The store is a cheap-to-clone handle around shared state. Consumers
//! subscribe explicitly and are called back with the new theme on every real
//! change. Persistence and the DOM marker sit behind small traits so the store
//! itself stays free of browser calls.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info, warn};
use wasm_bindgen::JsCast;

use super::theme::Theme;

/// Storage key holding the selected theme id.
pub const THEME_STORAGE_KEY: &str = "cyber-theme";

const THEME_ATTRIBUTE: &str = "data-theme";

/// Failure reading or writing persisted state.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	/// No window, or the browser denies access (private mode, sandboxed frame).
	#[error("local storage is unavailable")]
	Unavailable,
	/// A storage call threw.
	#[error("storage call failed: {0}")]
	Js(String),
}

/// Key-value persistence for the selected theme.
pub trait ThemeStorage {
	/// Stored theme id, or `None` if nothing was saved.
	fn load(&self) -> Result<Option<String>, StorageError>;
	/// Persist a theme id.
	fn save(&self, value: &str) -> Result<(), StorageError>;
}

/// Browser `localStorage` backend.
pub struct LocalStorage {
	storage: web_sys::Storage,
	key: &'static str,
}

impl LocalStorage {
	/// Open the window's `localStorage`, reading and writing `key`.
	pub fn open(key: &'static str) -> Result<Self, StorageError> {
		let window = web_sys::window().ok_or(StorageError::Unavailable)?;
		let storage = window
			.local_storage()
			.map_err(|e| StorageError::Js(format!("{e:?}")))?
			.ok_or(StorageError::Unavailable)?;
		Ok(Self { storage, key })
	}
}

impl ThemeStorage for LocalStorage {
	fn load(&self) -> Result<Option<String>, StorageError> {
		self.storage
			.get_item(self.key)
			.map_err(|e| StorageError::Js(format!("{e:?}")))
	}

	fn save(&self, value: &str) -> Result<(), StorageError> {
		self.storage
			.set_item(self.key, value)
			.map_err(|e| StorageError::Js(format!("{e:?}")))
	}
}

/// In-memory backend; used when the browser store is unavailable.
#[derive(Default)]
pub struct MemoryStorage {
	value: RefCell<Option<String>>,
	writes: Cell<usize>,
}

impl MemoryStorage {
	/// Storage pre-filled with `value`.
	pub fn with_value(value: impl Into<String>) -> Self {
		Self {
			value: RefCell::new(Some(value.into())),
			writes: Cell::new(0),
		}
	}

	/// Number of successful `save` calls.
	pub fn writes(&self) -> usize {
		self.writes.get()
	}
}

impl ThemeStorage for MemoryStorage {
	fn load(&self) -> Result<Option<String>, StorageError> {
		Ok(self.value.borrow().clone())
	}

	fn save(&self, value: &str) -> Result<(), StorageError> {
		*self.value.borrow_mut() = Some(value.to_string());
		self.writes.set(self.writes.get() + 1);
		Ok(())
	}
}

impl<S: ThemeStorage + ?Sized> ThemeStorage for Rc<S> {
	fn load(&self) -> Result<Option<String>, StorageError> {
		(**self).load()
	}

	fn save(&self, value: &str) -> Result<(), StorageError> {
		(**self).save(value)
	}
}

/// Global, page-level indication of the active theme (for CSS).
pub trait ThemeMarker {
	/// Mark `theme` as active.
	fn apply(&self, theme: Theme);
}

/// Sets `theme-<id>` classes and `data-theme` on `<html>` and `<body>`.
pub struct RootClassMarker;

impl ThemeMarker for RootClassMarker {
	fn apply(&self, theme: Theme) {
		let Some(document) = web_sys::window().and_then(|w| w.document()) else {
			return;
		};
		let root = document.document_element();
		let body = document.body().map(|b| b.unchecked_into::<web_sys::Element>());
		let stale: Vec<String> = Theme::ALL.iter().map(|t| t.css_class()).collect();

		for el in root.iter().chain(body.iter()) {
			let classes = el.class_list();
			for class in &stale {
				let _ = classes.remove_1(class);
			}
			let _ = classes.add_1(&theme.css_class());
			let _ = el.set_attribute(THEME_ATTRIBUTE, theme.id());
		}
	}
}

/// Marker that does nothing.
pub struct NoMarker;

impl ThemeMarker for NoMarker {
	fn apply(&self, _theme: Theme) {}
}

/// Handle returned by [`ThemeStore::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(Theme)>;

struct StoreInner {
	current: Cell<Theme>,
	storage: Box<dyn ThemeStorage>,
	marker: Box<dyn ThemeMarker>,
	listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
	next_id: Cell<u64>,
}

/// Shared theme selection with explicit subscriptions.
#[derive(Clone)]
pub struct ThemeStore {
	inner: Rc<StoreInner>,
}

impl ThemeStore {
	/// Create a store, restoring the persisted theme (or the default) and
	/// applying it to the marker.
	pub fn new(storage: Box<dyn ThemeStorage>, marker: Box<dyn ThemeMarker>) -> Self {
		let current = match storage.load() {
			Ok(Some(value)) => value.parse::<Theme>().unwrap_or_else(|e| {
				debug!("portfolio-field: ignoring persisted theme: {}", e);
				Theme::default()
			}),
			Ok(None) => Theme::default(),
			Err(e) => {
				debug!("portfolio-field: theme storage unreadable: {}", e);
				Theme::default()
			}
		};
		marker.apply(current);

		Self {
			inner: Rc::new(StoreInner {
				current: Cell::new(current),
				storage,
				marker,
				listeners: RefCell::new(Vec::new()),
				next_id: Cell::new(0),
			}),
		}
	}

	/// Store backed by `localStorage` and the document root marker.
	/// Falls back to in-memory storage when `localStorage` is unavailable.
	pub fn from_browser() -> Self {
		let storage: Box<dyn ThemeStorage> = match LocalStorage::open(THEME_STORAGE_KEY) {
			Ok(s) => Box::new(s),
			Err(e) => {
				warn!("portfolio-field: {}, theme will not persist", e);
				Box::new(MemoryStorage::default())
			}
		};
		let store = Self::new(storage, Box::new(RootClassMarker));
		info!("portfolio-field: theme is {}", store.current());
		store
	}

	/// Active theme.
	pub fn current(&self) -> Theme {
		self.inner.current.get()
	}

	/// Make `theme` active: update the marker, persist, notify subscribers.
	/// Reselecting the active theme does nothing.
	pub fn select(&self, theme: Theme) {
		if self.current() == theme {
			return;
		}
		self.inner.current.set(theme);
		self.inner.marker.apply(theme);
		if let Err(e) = self.inner.storage.save(theme.id()) {
			warn!("portfolio-field: failed to persist theme: {}", e);
		}
		debug!("portfolio-field: theme changed to {}", theme);

		// Snapshot so listeners may subscribe or unsubscribe re-entrantly.
		let listeners: Vec<Listener> = self
			.inner
			.listeners
			.borrow()
			.iter()
			.map(|(_, l)| l.clone())
			.collect();
		for listener in listeners {
			listener(theme);
		}
	}

	/// Select by id; unknown ids are ignored.
	pub fn select_str(&self, id: &str) {
		match id.parse::<Theme>() {
			Ok(theme) => self.select(theme),
			Err(e) => debug!("portfolio-field: ignoring theme selection: {}", e),
		}
	}

	/// Call `listener` with the new theme on every change until unsubscribed.
	pub fn subscribe(&self, listener: impl Fn(Theme) + 'static) -> SubscriptionId {
		let id = SubscriptionId(self.inner.next_id.get());
		self.inner.next_id.set(id.0 + 1);
		self.inner
			.listeners
			.borrow_mut()
			.push((id, Rc::new(listener)));
		id
	}

	/// Remove a subscription. Returns `false` if it was already gone.
	pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
		let mut listeners = self.inner.listeners.borrow_mut();
		let before = listeners.len();
		listeners.retain(|(sid, _)| *sid != id);
		listeners.len() != before
	}

	/// Number of live subscriptions.
	pub fn subscriber_count(&self) -> usize {
		self.inner.listeners.borrow().len()
	}
}
