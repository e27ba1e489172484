//! Python Bindings
//!
//! Exposes scopes and signals to Python as `filament._core.Scope` and
//! `filament._core.Signal`. Effects are plain Python callables.
//!
//! A Python exception raised inside an effect cannot unwind through the
//! engine. The effect body parks the first failure in a slot shared by the
//! scope and its signals, the rest of the cascade still runs, and the binding
//! that started the cascade (`Scope.effect` or `Signal.set`) raises it once
//! the engine returns.

use std::cell::RefCell;
use std::rc::Rc;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::PolicyKind;
use crate::error::{ConfigError, ScopeError};
use crate::reactive::{Scope, ScopeBuilder, Signal};

impl From<ScopeError> for PyErr {
    fn from(err: ScopeError) -> Self {
        PyRuntimeError::new_err(err.to_string())
    }
}

/// First exception raised by an effect since the last cascade finished.
type PendingError = Rc<RefCell<Option<PyErr>>>;

/// Raise any exception an effect body left behind.
fn raise_pending(pending: &PendingError) -> PyResult<()> {
    match pending.borrow_mut().take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Python-exposed reactive scope.
#[pyclass(name = "Scope", unsendable)]
pub struct PyScope {
    scope: Scope,
    pending: PendingError,
}

#[pymethods]
impl PyScope {
    #[new]
    #[pyo3(signature = (policy = "accumulate"))]
    fn new(policy: &str) -> PyResult<Self> {
        let kind: PolicyKind = policy
            .parse()
            .map_err(|e: ConfigError| PyValueError::new_err(e.to_string()))?;
        Ok(Self {
            scope: ScopeBuilder::new().boxed_policy(kind.build()).build(),
            pending: PendingError::default(),
        })
    }

    /// Create a signal holding `value`.
    fn signal(&self, value: PyObject) -> PySignal {
        PySignal {
            inner: self.scope.create_signal(value),
            pending: Rc::clone(&self.pending),
        }
    }

    /// Register `callback` as an effect and run it once. Returns its id.
    fn effect(&self, callback: PyObject) -> PyResult<usize> {
        let pending = Rc::clone(&self.pending);
        let effect = self.scope.create_effect(move || {
            Python::with_gil(|py| {
                if let Err(err) = callback.call0(py) {
                    pending.borrow_mut().get_or_insert(err);
                }
            })
        });
        raise_pending(&self.pending)?;
        Ok(effect.index())
    }

    #[getter]
    fn policy(&self) -> &'static str {
        self.scope.policy_name()
    }

    fn __repr__(&self) -> String {
        format!(
            "Scope(signals={}, effects={}, policy={})",
            self.scope.signal_count(),
            self.scope.effect_count(),
            self.scope.policy_name()
        )
    }
}

/// Python-exposed signal.
#[pyclass(name = "Signal", unsendable)]
pub struct PySignal {
    inner: Signal<PyObject>,
    pending: PendingError,
}

#[pymethods]
impl PySignal {
    /// Get the current value, subscribing the running effect.
    fn get(&self, py: Python<'_>) -> PyResult<PyObject> {
        Ok(self.inner.try_with(|value| value.clone_ref(py))?)
    }

    /// Set a new value and re-run subscribers.
    fn set(&self, value: PyObject) -> PyResult<()> {
        self.inner.try_set(value)?;
        raise_pending(&self.pending)
    }

    #[getter]
    fn value(&self, py: Python<'_>) -> PyResult<PyObject> {
        self.get(py)
    }

    #[setter]
    fn set_value(&self, value: PyObject) -> PyResult<()> {
        self.set(value)
    }

    /// Get the signal's id within its scope.
    #[getter]
    fn id(&self) -> usize {
        self.inner.id().index()
    }

    fn __repr__(&self, py: Python<'_>) -> String {
        let repr = self
            .inner
            .try_with_untracked(|value| value.bind(py).repr().map(|r| r.to_string()))
            .ok()
            .and_then(Result::ok)
            .unwrap_or_else(|| "?".to_string());
        format!(
            "Signal(id={}, value={}, subscribers={})",
            self.id(),
            repr,
            self.inner.subscriber_count()
        )
    }
}

/// Python module definition.
///
/// This function is called by Python when importing the module.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyScope>()?;
    m.add_class::<PySignal>()?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
