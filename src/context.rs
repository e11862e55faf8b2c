//! Process-wide generator state backing [`ObjectId`](crate::oid::ObjectId)
//! creation.
//!
//! A [`Context`] owns the 24-bit generation counter together with the clock
//! and machine-identity collaborators that supply the other ObjectId fields.
//! One default context exists per process; callers that need isolated counter
//! streams (or deterministic collaborators in tests) build their own.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU32, Ordering},
        OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

use rand::Rng;

const COUNTER_MASK: u32 = 0xFF_FFFF;

/// A source of wall-clock seconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn unix_time(&self) -> u32;
}

/// A source of the machine/process identity bytes embedded in an ObjectId:
/// a 3-byte digest identifying the host and the 2-byte process id.
pub trait MachineIdentity: Send + Sync {
    fn machine_hash(&self) -> [u8; 3];
    fn process_id(&self) -> u16;
}

/// [`Clock`] backed by [`SystemTime`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_time(&self) -> u32 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0)
    }
}

/// [`MachineIdentity`] backed by the host name and [`std::process::id`].
///
/// The machine hash is the first three bytes of an MD5 digest of the
/// hostname. When the hostname cannot be queried, a random per-process
/// identity is used instead so distinct hosts stay distinguishable.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemIdentity;

impl MachineIdentity for SystemIdentity {
    fn machine_hash(&self) -> [u8; 3] {
        let digest = md5::compute(hostname());
        [digest[0], digest[1], digest[2]]
    }

    fn process_id(&self) -> u16 {
        std::process::id() as u16
    }
}

#[cfg(unix)]
fn hostname() -> Vec<u8> {
    let mut buf = [0u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc == 0 {
        let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        if len > 0 {
            return buf[..len].to_vec();
        }
    }
    fallback_host_bytes()
}

#[cfg(not(unix))]
fn hostname() -> Vec<u8> {
    fallback_host_bytes()
}

// Stable for the process lifetime so every context derives the same identity.
fn fallback_host_bytes() -> Vec<u8> {
    static FALLBACK: OnceLock<[u8; 8]> = OnceLock::new();
    FALLBACK.get_or_init(|| rand::rng().random()).to_vec()
}

/// Configuration for a [`Context`].
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct ContextOptions {
    /// Whether the context will be used from multiple threads. When set,
    /// counter increments are atomic; when unset the caller is responsible
    /// for single-threaded use.
    pub thread_safe: bool,

    /// Whether to cache the process id at context creation instead of
    /// querying it on every generation.
    pub cache_pid: bool,

    /// Whether to cache the machine hash at context creation instead of
    /// querying it on every generation.
    pub cache_hostname: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        ContextOptions {
            thread_safe: false,
            cache_pid: true,
            cache_hostname: true,
        }
    }
}

/// Generator state for [`ObjectId`](crate::oid::ObjectId)s.
pub struct Context {
    options: ContextOptions,
    clock: Box<dyn Clock>,
    identity: Box<dyn MachineIdentity>,
    cached_machine: Option<[u8; 3]>,
    cached_pid: Option<u16>,
    counter: AtomicU32,
}

impl Context {
    /// A context with the default options and system collaborators.
    pub fn new() -> Context {
        Context::builder().build()
    }

    /// Start building a customized context.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// The process-wide default context: thread-safe, with the process id
    /// re-queried on every generation so forked children do not inherit the
    /// parent's identity bytes.
    pub fn default_context() -> &'static Context {
        static DEFAULT: OnceLock<Context> = OnceLock::new();
        DEFAULT.get_or_init(|| Context::builder().thread_safe(true).cache_pid(false).build())
    }

    /// The options this context was built with.
    pub fn options(&self) -> ContextOptions {
        self.options
    }

    /// Produce the raw bytes of a fresh ObjectId: 4-byte big-endian seconds,
    /// 3-byte machine hash, 2-byte little-endian pid, 3-byte big-endian
    /// counter.
    pub(crate) fn generate(&self) -> [u8; 12] {
        let seconds = self.clock.unix_time();
        let machine = self
            .cached_machine
            .unwrap_or_else(|| self.identity.machine_hash());
        let pid = self.cached_pid.unwrap_or_else(|| self.identity.process_id());
        let count = self.next_count();

        let mut bytes = [0u8; 12];
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..7].copy_from_slice(&machine);
        bytes[7..9].copy_from_slice(&pid.to_le_bytes());
        bytes[9..12].copy_from_slice(&count.to_be_bytes()[1..]);
        bytes
    }

    fn next_count(&self) -> u32 {
        if self.options.thread_safe {
            self.counter.fetch_add(1, Ordering::SeqCst) & COUNTER_MASK
        } else {
            // Caller contract: non-thread-safe contexts are driven from a
            // single thread, so an unsynchronized load/store pair suffices.
            let count = self.counter.load(Ordering::Relaxed);
            self.counter.store(count.wrapping_add(1), Ordering::Relaxed);
            count & COUNTER_MASK
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Context`].
pub struct ContextBuilder {
    options: ContextOptions,
    clock: Box<dyn Clock>,
    identity: Box<dyn MachineIdentity>,
    counter_seed: Option<u32>,
}

impl ContextBuilder {
    fn new() -> Self {
        ContextBuilder {
            options: ContextOptions::default(),
            clock: Box::new(SystemClock),
            identity: Box::new(SystemIdentity),
            counter_seed: None,
        }
    }

    /// See [`ContextOptions::thread_safe`].
    pub fn thread_safe(mut self, thread_safe: bool) -> Self {
        self.options.thread_safe = thread_safe;
        self
    }

    /// See [`ContextOptions::cache_pid`].
    pub fn cache_pid(mut self, cache_pid: bool) -> Self {
        self.options.cache_pid = cache_pid;
        self
    }

    /// See [`ContextOptions::cache_hostname`].
    pub fn cache_hostname(mut self, cache_hostname: bool) -> Self {
        self.options.cache_hostname = cache_hostname;
        self
    }

    /// Replace the wall-clock source.
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the machine-identity source.
    pub fn identity(mut self, identity: impl MachineIdentity + 'static) -> Self {
        self.identity = Box::new(identity);
        self
    }

    /// Fix the counter's starting value (masked to 24 bits) instead of
    /// seeding it randomly.
    pub fn counter_seed(mut self, seed: u32) -> Self {
        self.counter_seed = Some(seed & COUNTER_MASK);
        self
    }

    pub fn build(self) -> Context {
        let cached_machine = self
            .options
            .cache_hostname
            .then(|| self.identity.machine_hash());
        let cached_pid = self.options.cache_pid.then(|| self.identity.process_id());
        // Random starting point so counters are unpredictable across process
        // restarts.
        let seed = self
            .counter_seed
            .unwrap_or_else(|| rand::rng().random_range(0..=COUNTER_MASK));
        Context {
            options: self.options,
            clock: self.clock,
            identity: self.identity,
            cached_machine,
            cached_pid,
            counter: AtomicU32::new(seed),
        }
    }
}
