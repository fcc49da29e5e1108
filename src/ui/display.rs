//! SSD1306 OLED renderer.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::Text;
use homepanel::menu::MenuView;
use homepanel::ui::{Frame, Renderer};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

const TITLE_Y: i32 = 10;
const FIRST_ROW_Y: i32 = 23;
const ROW_HEIGHT: i32 = 10;
const FOOTER_Y: i32 = 63;
const CENTER_Y: i32 = 36;

fn text_style() -> embedded_graphics::mono_font::MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// Draws dashboard frames on the OLED.
pub struct OledRenderer<I2C> {
    display: Display<I2C>,
}

impl<I2C> OledRenderer<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the SSD1306 display and clear the screen.
    pub fn new(i2c: I2C) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        let _ = display.init();
        display.clear_buffer();
        let _ = display.flush();
        Self { display }
    }

    /// Status screen shown while the broker link is being (re)established.
    pub fn draw_connecting(&mut self, attempt: u32, host: &str) {
        self.display.clear_buffer();

        let _ = Text::new("Connecting...", Point::new(0, TITLE_Y), text_style()).draw(&mut self.display);
        let _ = Text::new(host, Point::new(0, 30), text_style()).draw(&mut self.display);

        let mut line: heapless::String<24> = heapless::String::new();
        let _ = write!(line, "attempt {}", attempt);
        let _ = Text::new(line.as_str(), Point::new(0, 44), text_style()).draw(&mut self.display);

        let _ = self.display.flush();
    }

    fn draw_menu(&mut self, view: &MenuView<'_>) {
        let _ = Text::new(view.title, Point::new(0, TITLE_Y), text_style()).draw(&mut self.display);
        let _ = Line::new(Point::new(0, 13), Point::new(127, 13))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut self.display);

        for (row, entry) in view.entries.iter().enumerate() {
            let marker = if entry.is_selected { ">" } else { " " };
            let mut line: heapless::String<36> = heapless::String::new();
            let _ = line.push_str(marker);
            let _ = line.push_str(" ");
            for c in entry.label.chars() {
                if line.push(c).is_err() {
                    break;
                }
            }
            let y = FIRST_ROW_Y + (row as i32 * ROW_HEIGHT);
            let _ = Text::new(line.as_str(), Point::new(0, y), text_style()).draw(&mut self.display);
        }

        if let Some(footer) = &view.footer {
            let _ = Text::new(footer.as_str(), Point::new(0, FOOTER_Y), text_style())
                .draw(&mut self.display);
        }
    }

    fn draw_alert(&mut self, message: &str) {
        let _ = Text::new("!! ALERT !!", Point::new(31, TITLE_Y + 6), text_style()).draw(&mut self.display);
        let _ = Text::new(message, Point::new(0, CENTER_Y + 4), text_style()).draw(&mut self.display);
    }
}

impl<I2C> Renderer for OledRenderer<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn render(&mut self, frame: &Frame<'_>) {
        self.display.clear_buffer();

        match frame {
            Frame::Menu(view) => self.draw_menu(view),
            Frame::Alert(message) => self.draw_alert(message),
            Frame::Notice(text) => {
                let _ = Text::new(text, Point::new(0, CENTER_Y), text_style()).draw(&mut self.display);
            }
            Frame::Blank => {}
        }

        let _ = self.display.flush();
    }

    fn set_power(&mut self, on: bool) {
        let _ = self.display.set_display_on(on);
    }
}
