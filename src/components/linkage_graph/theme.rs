//! Visual theming for the linkage graph.
//!
//! Entity types carry fixed colors matching the analyst console, so a uid
//! reads the same across cases; everything else (background, edges, rings,
//! status text) is themeable.

use super::types::EntityType;

/// RGBA color representation.
#[derive(Clone, Copy, Debug)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Per-type node colors.
#[derive(Clone, Debug)]
pub struct EntityPalette {
	pub uid: Color,
	pub vendor: Color,
	pub device: Color,
	pub ip: Color,
	pub phone: Color,
}

impl EntityPalette {
	/// The analyst console palette: uid blue, vendor green, device violet,
	/// ip pink, phone gray.
	pub fn console() -> Self {
		Self {
			uid: Color::rgb(37, 99, 235),
			vendor: Color::rgb(5, 150, 105),
			device: Color::rgb(124, 58, 237),
			ip: Color::rgb(219, 39, 119),
			phone: Color::rgb(107, 114, 128),
		}
	}

	pub fn get(&self, entity_type: EntityType) -> Color {
		match entity_type {
			EntityType::Uid => self.uid,
			EntityType::Vendor => self.vendor,
			EntityType::Device => self.device,
			EntityType::Ip => self.ip,
			EntityType::Phone => self.phone,
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
}

/// Edge visual style.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	/// Base edge color
	pub color: Color,
	/// Color of the edge currently under inspection
	pub selected_color: Color,
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Ring color for seed (layer-0) nodes
	pub seed_ring: Color,
	/// Ring color for discovered satellite nodes
	pub satellite_ring: Color,
	/// Label text color
	pub label: Color,
}

/// Status strip style.
#[derive(Clone, Debug)]
pub struct StatusStyle {
	pub text: Color,
	/// Color for the truncation warning.
	pub warn: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub status: StatusStyle,
	pub palette: EntityPalette,
}

impl Theme {
	/// Dark theme tuned for long review sessions (default).
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
			},
			edge: EdgeStyle {
				color: Color::rgba(140, 160, 180, 0.5),
				selected_color: Color::rgba(250, 204, 21, 0.9),
			},
			node: NodeStyle {
				use_gradient: true,
				seed_ring: Color::rgb(255, 255, 255),
				satellite_ring: Color::rgb(17, 17, 17),
				label: Color::rgb(255, 255, 255),
			},
			status: StatusStyle {
				text: Color::rgba(200, 210, 220, 0.9),
				warn: Color::rgb(239, 68, 68),
			},
			palette: EntityPalette::console(),
		}
	}

	/// Light theme matching the admin panel's white cards.
	pub fn light() -> Self {
		Self {
			name: "light",
			background: BackgroundStyle {
				color: Color::rgb(255, 255, 255),
				color_secondary: Color::rgb(244, 246, 248),
				use_gradient: false,
			},
			edge: EdgeStyle {
				color: Color::rgba(71, 85, 105, 0.5),
				selected_color: Color::rgba(202, 138, 4, 0.9),
			},
			node: NodeStyle {
				use_gradient: false,
				seed_ring: Color::rgb(255, 255, 255),
				satellite_ring: Color::rgb(17, 17, 17),
				label: Color::rgb(255, 255, 255),
			},
			status: StatusStyle {
				text: Color::rgba(71, 85, 105, 0.9),
				warn: Color::rgb(220, 38, 38),
			},
			palette: EntityPalette::console(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
