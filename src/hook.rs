//! Custom decode hooks bound to their owning record.
//!
//! A record field annotated with `#[layout(hook = "encode_x, decode_x")]` is
//! decoded by calling `decode_x` on the record with the remainder of the
//! buffer. The method must have the signature
//!
//! ```ignore
//! fn decode_x(&mut self, r: &[u8]) -> Result<usize, bytelayout::Error>
//! ```
//!
//! returning the number of bytes it consumed. Any other parameter or return
//! type is rejected by the compiler. Methods taking `&self` or `self` compile,
//! but cannot store what they decode: they are refused with
//! [`Error::InvalidCodecSignature`] when the hook is resolved, before it runs.

use alloc::boxed::Box;

use crate::{decode::Error, target::FieldTarget};

/// A decode hook bound to its owner, ready to be called with the remaining
/// bytes of a buffer.
pub struct Hook<'a>(Box<dyn FnMut(&[u8]) -> Result<usize, Error> + 'a>);

impl<'a> Hook<'a> {
    pub fn new(f: impl FnMut(&[u8]) -> Result<usize, Error> + 'a) -> Self {
        Self(Box::new(f))
    }

    /// Run the hook, returning the number of bytes it consumed.
    pub fn call(&mut self, r: &[u8]) -> Result<usize, Error> {
        (self.0)(r)
    }
}

/// Receiver marker for `fn(&mut self, ..)` hooks.
pub struct Exclusive;
/// Receiver marker for `fn(&self, ..)` hooks.
pub struct Shared;
/// Receiver marker for `fn(self, ..)` hooks.
pub struct Owned;

/// A method usable as the decode hook of a record of type `R`.
///
/// `M` is a receiver marker inferred from the method's signature.
pub trait DecodeHook<R, M> {
    /// Bind this hook to its owner.
    fn resolve<'a>(self, owner: &'a mut R, record: &'static str, method: &'static str)
    -> Result<Hook<'a>, Error>
    where
        R: 'a;
}

impl<R, F> DecodeHook<R, Exclusive> for F
where
    F: Fn(&mut R, &[u8]) -> Result<usize, Error> + 'static,
{
    fn resolve<'a>(self, owner: &'a mut R, _: &'static str, _: &'static str) -> Result<Hook<'a>, Error>
    where
        R: 'a,
    {
        let hook = self;
        Ok(Hook::new(move |r: &[u8]| hook(&mut *owner, r)))
    }
}

impl<R, F> DecodeHook<R, Shared> for F
where
    F: Fn(&R, &[u8]) -> Result<usize, Error>,
{
    fn resolve<'a>(self, _: &'a mut R, record: &'static str, method: &'static str) -> Result<Hook<'a>, Error>
    where
        R: 'a,
    {
        Err(Error::InvalidCodecSignature {
            record,
            method,
            reason: "receiver must be `&mut self`, found `&self`",
        })
    }
}

impl<R, F> DecodeHook<R, Owned> for F
where
    F: Fn(R, &[u8]) -> Result<usize, Error>,
{
    fn resolve<'a>(self, _: &'a mut R, record: &'static str, method: &'static str) -> Result<Hook<'a>, Error>
    where
        R: 'a,
    {
        Err(Error::InvalidCodecSignature {
            record,
            method,
            reason: "receiver must be `&mut self`, found `self`",
        })
    }
}

/// Resolve the decode hook `method` of `owner` into a field target.
///
/// Called by code generated with the [`Record`](macro@crate::Record) derive
/// macro, and usable from hand-written [`Record`](crate::Record)
/// implementations.
pub fn bind<'a, R, M>(
    owner: &'a mut R,
    hook: impl DecodeHook<R, M>,
    record: &'static str,
    method: &'static str,
) -> Result<FieldTarget<'a>, Error> {
    hook.resolve(owner, record, method).map(FieldTarget::Hook)
}
