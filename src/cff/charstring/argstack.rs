use super::{CharStringError, MAX_ARGUMENTS_STACK_LEN};

/// Storage for the operand stack while decompiling Type 2 charstrings.
#[derive(Debug, Clone)]
pub struct ArgumentsStack {
    data: [f32; MAX_ARGUMENTS_STACK_LEN],
    len: usize,
}

impl ArgumentsStack {
    pub fn new() -> Self {
        ArgumentsStack {
            data: [0.0; MAX_ARGUMENTS_STACK_LEN],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, n: f32) -> Result<(), CharStringError> {
        if self.len == MAX_ARGUMENTS_STACK_LEN {
            Err(CharStringError::ArgumentsStackLimitReached)
        } else {
            self.data[self.len] = n;
            self.len += 1;
            Ok(())
        }
    }

    pub fn pop(&mut self) -> Option<f32> {
        if self.is_empty() {
            return None;
        }
        self.len -= 1;
        Some(self.data[self.len])
    }

    pub fn all(&self) -> &[f32] {
        &self.data[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl Default for ArgumentsStack {
    fn default() -> Self {
        ArgumentsStack::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut stack = ArgumentsStack::new();
        stack.push(1.0).unwrap();
        stack.push(2.5).unwrap();
        assert_eq!(stack.all(), &[1.0, 2.5]);
        assert_eq!(stack.pop(), Some(2.5));
        assert_eq!(stack.len(), 1);
        stack.clear();
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_limit() {
        let mut stack = ArgumentsStack::new();
        for _ in 0..MAX_ARGUMENTS_STACK_LEN {
            stack.push(0.0).unwrap();
        }
        assert_eq!(
            stack.push(0.0),
            Err(CharStringError::ArgumentsStackLimitReached)
        );
    }
}
