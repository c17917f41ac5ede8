/// Something that can display how far a long walk has come.
///
/// Entirely optional: the refresh produces the same writes whether or not
/// a reporter is attached.
pub trait Progress {
    fn start(&mut self, message: &str, total: usize);

    fn advance(&mut self, count: usize);

    fn finish(&mut self);
}

/// Iterator adapter that reports every item to a [`Progress`] and calls
/// [`Progress::finish`] once the inner iterator is exhausted.
pub struct WithProgress<'p, I, P: Progress + ?Sized> {
    inner: I,
    progress: &'p mut P,
    finished: bool,
}

pub fn with_progress<'p, I, P>(
    iter: I,
    progress: &'p mut P,
    message: &str,
    total: usize,
) -> WithProgress<'p, I::IntoIter, P>
where
    I: IntoIterator,
    P: Progress + ?Sized,
{
    progress.start(message, total);
    WithProgress {
        inner: iter.into_iter(),
        progress,
        finished: false,
    }
}

impl<I, P> Iterator for WithProgress<'_, I, P>
where
    I: Iterator,
    P: Progress + ?Sized,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match self.inner.next() {
            Some(item) => {
                self.progress.advance(1);
                Some(item)
            }
            None => {
                if !self.finished {
                    self.finished = true;
                    self.progress.finish();
                }
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
