use crate::error::TransportError;

/// A remotely sourced value: idle, loading, failed or ready.
///
/// `data` may stay populated while `is_loading` is set so a refetch can keep
/// showing the previous value. Use [`AsyncResource::state`] to read which state
/// is current instead of inspecting the fields one by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsyncResource<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<TransportError>,
}

/// Borrowed view of the current state of an [`AsyncResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState<'a, T> {
    Idle,
    Loading(Option<&'a T>),
    Error(&'a TransportError),
    Ready(&'a T),
}

impl<T> Default for AsyncResource<T> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T> AsyncResource<T> {
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::idle()
        }
    }

    pub fn ready(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::idle()
        }
    }

    pub fn failed(error: TransportError) -> Self {
        Self {
            error: Some(error),
            ..Self::idle()
        }
    }

    /// Start a refetch, keeping the stale value visible.
    pub fn revalidating(self) -> Self {
        Self {
            data: self.data,
            is_loading: true,
            error: None,
        }
    }

    pub fn state(&self) -> ResourceState<'_, T> {
        if self.is_loading {
            ResourceState::Loading(self.data.as_ref())
        } else if let Some(error) = &self.error {
            ResourceState::Error(error)
        } else if let Some(data) = &self.data {
            ResourceState::Ready(data)
        } else {
            ResourceState::Idle
        }
    }

    /// Transform the data in place, keeping the loading and error flags.
    pub fn map_data(self, f: impl FnOnce(T) -> T) -> Self {
        Self {
            data: self.data.map(f),
            is_loading: self.is_loading,
            error: self.error,
        }
    }
}

impl<T> From<Result<T, TransportError>> for AsyncResource<T> {
    fn from(result: Result<T, TransportError>) -> Self {
        match result {
            Ok(data) => Self::ready(data),
            Err(error) => Self::failed(error),
        }
    }
}
