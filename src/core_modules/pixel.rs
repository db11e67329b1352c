// THEORY (single-pixel colour math):
// The `Pixel` module is the most fundamental unit of the vision system. It is a
// "dumb" data container for one RGB sample plus the handful of 1-dimensional
// heuristics the pipelines need: metrics computed from this pixel alone, with no
// knowledge of neighbours in space or time.
//
// What lives here:
// - Brightness: Rec. 601 luma, used to collapse colour frames to greyscale
//   before frame differencing.
// - Hue / saturation / value: the cylindrical representation used by the colour
//   tracker. Object colour is far more stable under changing illumination in
//   this space than in raw RGB.
//
// HSV is stored in the 8-bit convention shared by the calibration tooling and
// every configured range: hue in [0, 180) (degrees halved so it fits a byte),
// saturation and value in [0, 255].
//
// Anything that needs another pixel (differences, morphology, contours) lives in
// the higher-level modules.

pub mod pixel {
    pub type Channel = u8;
    pub type Luminance = f64;
    pub type Hue = f32;

    /// Largest representable 8-bit hue (degrees / 2).
    pub const HUE_MAX: u8 = 179;

    /// A "dumb" data container representing a single RGB pixel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Pixel {
        pub red: Channel,
        pub green: Channel,
        pub blue: Channel,
    }

    /// A pixel in 8-bit HSV space: `h` in [0, 180), `s` and `v` in [0, 255].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Hsv {
        pub h: u8,
        pub s: u8,
        pub v: u8,
    }

    impl Hsv {
        pub const fn new(h: u8, s: u8, v: u8) -> Self {
            Self { h, s, v }
        }

        pub fn to_array(self) -> [u8; 3] {
            [self.h, self.s, self.v]
        }
    }

    impl Pixel {
        pub const fn new(red: Channel, green: Channel, blue: Channel) -> Self {
            Pixel { red, green, blue }
        }

        /// Luminance estimate (Rec. 601 luma) on the 0..255 scale.
        pub fn luminance(&self) -> Luminance {
            0.299_f64 * self.red as f64 + 0.587_f64 * self.green as f64 + 0.114_f64 * self.blue as f64
        }

        /// Luminance rounded back into a byte, as stored in greyscale frames.
        pub fn gray(&self) -> Channel {
            self.luminance().round().clamp(0.0, 255.0) as Channel
        }

        /// HSV value: the brightest channel.
        pub fn value(&self) -> Channel {
            self.red.max(self.green).max(self.blue)
        }

        /// Chroma on the 0..255 scale (max - min).
        pub fn chroma(&self) -> Channel {
            self.value() - self.red.min(self.green).min(self.blue)
        }

        /// Hue angle in degrees [0, 360). Achromatic pixels report 0.
        pub fn hue_degrees(&self) -> Hue {
            let chroma = self.chroma() as f32;
            if chroma <= 0.0 {
                return 0.0;
            }

            let (red, green, blue) = (self.red as f32, self.green as f32, self.blue as f32);
            let maximum_channel = self.value();

            let (base_difference, sector_offset) = if maximum_channel == self.red {
                (green - blue, 0.0)
            } else if maximum_channel == self.green {
                (blue - red, 2.0)
            } else {
                (red - green, 4.0)
            };

            let mut hue_degrees = (base_difference / chroma + sector_offset) * 60.0;
            if hue_degrees < 0.0 {
                hue_degrees += 360.0;
            }
            hue_degrees
        }

        /// Converts to 8-bit HSV.
        pub fn to_hsv(&self) -> Hsv {
            let value = self.value();
            let saturation = if value == 0 {
                0
            } else {
                (self.chroma() as f32 * 255.0 / value as f32).round() as u8
            };
            let mut hue = (self.hue_degrees() / 2.0).round() as u16;
            if hue > HUE_MAX as u16 {
                hue = 0;
            }
            Hsv::new(hue as u8, saturation, value)
        }
    }

    impl From<&[u8]> for Pixel {
        fn from(bytes: &[u8]) -> Self {
            Pixel::new(bytes[0], bytes[1], bytes[2])
        }
    }

    impl From<Pixel> for [u8; 3] {
        fn from(pixel: Pixel) -> Self {
            [pixel.red, pixel.green, pixel.blue]
        }
    }
}
