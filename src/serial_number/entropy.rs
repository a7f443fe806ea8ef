use std::fs;
use std::io::Read;

/// Source of randomness for board numbers that were not configured.
pub trait Entropy {
	/// `None` if no randomness is available
	fn next_u32(&mut self) -> Option<u32>;
}

/// Reads from the kernel's `/dev/urandom`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct DevUrandom;

const URANDOM_PATH: &str = "/dev/urandom";

impl Entropy for DevUrandom {
	fn next_u32(&mut self) -> Option<u32> {
		let mut buf = [0u8; 4];
		let result = fs::File::open(URANDOM_PATH).and_then(|mut f| f.read_exact(&mut buf));
		match result {
			Ok(()) => Some(u32::from_ne_bytes(buf)),
			Err(e) => {
				warn!("couldn't read random data from {}: {}", URANDOM_PATH, e);
				None
			},
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct NoEntropy;

impl Entropy for NoEntropy {
	fn next_u32(&mut self) -> Option<u32> {
		None
	}
}

/// Always yields the same value; for reproducible images.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FixedEntropy(pub u32);

impl Entropy for FixedEntropy {
	fn next_u32(&mut self) -> Option<u32> {
		Some(self.0)
	}
}
