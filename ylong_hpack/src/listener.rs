// Copyright (c) 2023 Huawei Device Co., Ltd.
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Sink for decoded header fields.

/// Receives the header fields of a header block in the order they become
/// known.
///
/// # Examples
///
/// ```
/// use ylong_hpack::HeaderListener;
///
/// struct Count(usize);
///
/// impl HeaderListener for Count {
///     fn emit_header(&mut self, _name: &[u8], _value: &[u8]) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait HeaderListener {
    /// Called once for every header field of the decoded header list.
    fn emit_header(&mut self, name: &[u8], value: &[u8]);
}

/// Collects owned `(name, value)` pairs.
impl HeaderListener for Vec<(Vec<u8>, Vec<u8>)> {
    fn emit_header(&mut self, name: &[u8], value: &[u8]) {
        self.push((name.to_vec(), value.to_vec()));
    }
}

impl<L: HeaderListener + ?Sized> HeaderListener for &mut L {
    fn emit_header(&mut self, name: &[u8], value: &[u8]) {
        (**self).emit_header(name, value)
    }
}

#[cfg(test)]
mod ut_listener {
    use crate::listener::HeaderListener;

    fn emit<L: HeaderListener>(mut listener: L) {
        listener.emit_header(b"name", b"value");
    }

    /// UT test cases for `HeaderListener` on `Vec`.
    ///
    /// # Brief
    /// 1. Emits a header field into a `Vec`, directly and by reference.
    /// 2. Checks that the pairs are collected in order.
    #[test]
    fn ut_listener_vec() {
        let mut headers: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
        headers.emit_header(b":method", b"GET");
        emit(&mut headers);
        assert_eq!(
            headers,
            vec![
                (b":method".to_vec(), b"GET".to_vec()),
                (b"name".to_vec(), b"value".to_vec()),
            ]
        );
    }
}
