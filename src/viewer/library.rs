use tracing::debug;

use crate::host::ImageSource;
use crate::viewer::Photo;

/// Hands out the loaded photos in order, wrapping around when looping.
pub struct PhotoLibrary {
    photos: Vec<Photo>,
    next: usize,
    looping: bool,
}

impl PhotoLibrary {
    pub fn new(photos: Vec<Photo>, looping: bool) -> Self {
        Self {
            photos,
            next: 0,
            looping,
        }
    }

    /// Starts over from the first photo.
    pub fn rewind(&mut self) {
        self.next = 0;
    }
}

impl ImageSource<Photo> for PhotoLibrary {
    fn next_image(&mut self) -> Option<Photo> {
        if self.next >= self.photos.len() {
            if !self.looping || self.photos.is_empty() {
                return None;
            }
            debug!("photo library wrapped around");
            self.next = 0;
        }
        let photo = self.photos[self.next].clone();
        self.next += 1;
        Some(photo)
    }
}
