use crate::EmptyQueueError;

/// A FIFO queue that also supports insertion at an arbitrary position.
///
/// The scanner uses the insertion to place a `KEY` token in front of a
/// simple key once the `:` following it has been seen.
#[derive(Debug, Clone)]
pub struct InsertionQueue<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T> Default for InsertionQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InsertionQueue<T> {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity.max(1));
        slots.resize_with(capacity.max(1), || None);
        InsertionQueue {
            slots,
            head: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot(&self, index: usize) -> usize {
        (self.head + index) % self.slots.len()
    }

    fn grow(&mut self) {
        let capacity = self.slots.len();
        let mut slots = Vec::with_capacity(capacity * 2);
        for i in 0..self.len {
            let slot = self.slot(i);
            slots.push(self.slots[slot].take());
        }
        slots.resize_with(capacity * 2, || None);
        self.slots = slots;
        self.head = 0;
    }

    /// Append an item at the back.
    pub fn enqueue(&mut self, item: T) {
        if self.len == self.slots.len() {
            self.grow();
        }
        let tail = self.slot(self.len);
        self.slots[tail] = Some(item);
        self.len += 1;
    }

    /// Remove the item at the front.
    pub fn dequeue(&mut self) -> Result<T, EmptyQueueError> {
        if self.len == 0 {
            return Err(EmptyQueueError);
        }
        let item = self.slots[self.head].take().ok_or(EmptyQueueError)?;
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        Ok(item)
    }

    /// Insert an item so that it ends up `index` positions from the front.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than the length of the queue.
    pub fn insert(&mut self, index: usize, item: T) {
        assert!(
            index <= self.len,
            "insertion index {index} is out of range for a queue of length {}",
            self.len
        );
        if self.len == self.slots.len() {
            self.grow();
        }
        let mut i = self.len;
        while i > index {
            let from = self.slot(i - 1);
            let to = self.slot(i);
            self.slots[to] = self.slots[from].take();
            i -= 1;
        }
        let at = self.slot(index);
        self.slots[at] = Some(item);
        self.len += 1;
    }

    pub fn front(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            self.slots[self.head].as_ref()
        }
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            None
        } else {
            self.slots[self.head].as_mut()
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            self.slots[self.slot(index)].as_ref()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fifo_order() {
        let mut queue = InsertionQueue::new();
        for i in 0..40 {
            queue.enqueue(i);
        }
        for i in 0..40 {
            assert_eq!(queue.dequeue(), Ok(i));
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn insert_in_the_middle() {
        let mut queue = InsertionQueue::with_capacity(4);
        for i in 0..10 {
            queue.enqueue(i);
        }
        queue.insert(5, 99);
        let items: Vec<_> = queue.iter().copied().collect();
        assert_eq!(items, vec![0, 1, 2, 3, 4, 99, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn insert_at_len_appends() {
        let mut queue = InsertionQueue::new();
        queue.enqueue('a');
        queue.insert(1, 'b');
        queue.insert(0, 'c');
        assert_eq!(queue.iter().collect::<String>(), "cab");
    }

    #[test]
    fn dequeue_empty() {
        let mut queue = InsertionQueue::<u8>::new();
        assert_eq!(queue.dequeue(), Err(EmptyQueueError));
        assert_eq!(queue.front(), None);
    }

    #[test]
    fn wraparound_then_insert() {
        let mut queue = InsertionQueue::with_capacity(4);
        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);
        assert_eq!(queue.dequeue(), Ok(1));
        assert_eq!(queue.dequeue(), Ok(2));
        queue.enqueue(4);
        queue.enqueue(5);
        queue.insert(1, 10);
        queue.insert(0, 11);
        let items: Vec<_> = queue.iter().copied().collect();
        assert_eq!(items, vec![11, 3, 10, 4, 5]);
        *queue.front_mut().unwrap() = 12;
        assert_eq!(queue.dequeue(), Ok(12));
        assert_eq!(queue.len(), 4);
    }

    #[test]
    #[should_panic = "out of range"]
    fn insert_past_end() {
        let mut queue = InsertionQueue::new();
        queue.enqueue(0);
        queue.insert(2, 1);
    }
}
